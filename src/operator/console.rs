//! Console implementation of the operator trait.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::common::error::PromptError;
use crate::common::types::{PlumbRequest, RoomId, RoomSnapshot, UserId};

use super::{LoginInput, Operator, ToolChoice};

/// Line-oriented prompts over stdin/stdout.
pub struct ConsoleOperator {
    lines: Lines<BufReader<Stdin>>,
}

impl ConsoleOperator {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn read_line(&mut self, prompt: &str) -> Result<String, PromptError> {
        println!("{}", prompt);
        match self.lines.next_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(PromptError::Closed),
        }
    }

    /// Numbered single-choice menu; empty input aborts.
    async fn pick_index(
        &mut self,
        prompt: &str,
        items: &[String],
    ) -> Result<Option<usize>, PromptError> {
        println!("{}", prompt);
        for (i, item) in items.iter().enumerate() {
            println!("  {}) {}", i + 1, item);
        }
        loop {
            let line = self.read_line("Number (empty to abort):").await?;
            if line.is_empty() {
                return Ok(None);
            }
            match line.parse::<usize>() {
                Ok(n) if n >= 1 && n <= items.len() => return Ok(Some(n - 1)),
                _ => println!("Enter a number between 1 and {}", items.len()),
            }
        }
    }

    /// Comma-separated multi-choice menu; empty input selects nothing.
    async fn pick_indices(
        &mut self,
        prompt: &str,
        items: &[String],
    ) -> Result<Vec<usize>, PromptError> {
        println!("{}", prompt);
        for (i, item) in items.iter().enumerate() {
            println!("  {}) {}", i + 1, item);
        }
        loop {
            let line = self
                .read_line("Numbers, comma-separated (empty for none):")
                .await?;
            if line.is_empty() {
                return Ok(Vec::new());
            }
            let parsed: Result<Vec<usize>, _> = line
                .split(',')
                .map(|part| part.trim().parse::<usize>())
                .collect();
            match parsed {
                Ok(numbers) if numbers.iter().all(|&n| n >= 1 && n <= items.len()) => {
                    return Ok(dedupe_preserving_order(
                        numbers.into_iter().map(|n| n - 1),
                    ));
                }
                _ => println!("Enter numbers between 1 and {}", items.len()),
            }
        }
    }
}

impl Default for ConsoleOperator {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop repeated selections like `1,1`, keeping first-occurrence order, so
/// a doubled entry never dispatches the same command twice.
fn dedupe_preserving_order(indices: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut out = Vec::new();
    for index in indices {
        if !out.contains(&index) {
            out.push(index);
        }
    }
    out
}

fn room_labels(rooms: &[RoomSnapshot]) -> Vec<String> {
    rooms
        .iter()
        .map(|r| format!("{} ({} members)", r.display_name, r.members.len()))
        .collect()
}

#[async_trait]
impl Operator for ConsoleOperator {
    async fn choose_tool(&mut self, networks: &[String]) -> Result<ToolChoice, PromptError> {
        let mut items = vec!["Quit".to_string()];
        for net in networks {
            items.push(format!("Plumb {}", net));
            items.push(format!("Grant ops ({})", net));
            items.push(format!("Revoke ops ({})", net));
        }
        items.push("Leave rooms".to_string());

        let choice = self.pick_index("What do you want to do?", &items).await?;
        let Some(index) = choice else {
            return Ok(ToolChoice::Quit);
        };
        if index == 0 {
            return Ok(ToolChoice::Quit);
        }
        if index == items.len() - 1 {
            return Ok(ToolChoice::LeaveRooms);
        }
        let network = networks[(index - 1) / 3].clone();
        Ok(match (index - 1) % 3 {
            0 => ToolChoice::Plumb { network },
            1 => ToolChoice::GrantOps { network },
            _ => ToolChoice::RevokeOps { network },
        })
    }

    async fn collect_login(&mut self, default_user: &str) -> Result<LoginInput, PromptError> {
        let homeserver = self
            .read_line("Matrix homeserver (example: https://matrix.org):")
            .await?;
        let user = self
            .read_line(&format!(
                "Matrix user (example: @user:matrix.org) [{}]:",
                default_user
            ))
            .await?;
        let user = if user.is_empty() {
            default_user.to_string()
        } else {
            user
        };
        let password = self.read_line("Password:").await?;
        Ok(LoginInput {
            homeserver,
            user,
            password,
        })
    }

    async fn collect_plumb_input(
        &mut self,
        rooms: &[RoomSnapshot],
    ) -> Result<Option<PlumbRequest>, PromptError> {
        let channel = self.read_line("Enter IRC channel name:").await?;
        if channel.is_empty() {
            return Ok(None);
        }
        let op_nick = self
            .read_line("Nick of an op on the IRC channel:")
            .await?;
        if op_nick.is_empty() {
            return Ok(None);
        }
        let Some(index) = self
            .pick_index("Choose a room to plumb:", &room_labels(rooms))
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(PlumbRequest {
            room_id: rooms[index].room_id.clone(),
            channel,
            op_nick,
        }))
    }

    async fn select_room(
        &mut self,
        prompt: &str,
        rooms: &[RoomSnapshot],
    ) -> Result<Option<RoomId>, PromptError> {
        Ok(self
            .pick_index(prompt, &room_labels(rooms))
            .await?
            .map(|i| rooms[i].room_id.clone()))
    }

    async fn select_rooms(
        &mut self,
        prompt: &str,
        rooms: &[RoomSnapshot],
    ) -> Result<Vec<RoomId>, PromptError> {
        let indices = self.pick_indices(prompt, &room_labels(rooms)).await?;
        Ok(indices.into_iter().map(|i| rooms[i].room_id.clone()).collect())
    }

    async fn collect_channel_name(&mut self) -> Result<Option<String>, PromptError> {
        let channel = self.read_line("Enter IRC channel name:").await?;
        Ok(if channel.is_empty() {
            None
        } else {
            Some(channel)
        })
    }

    async fn select_members(&mut self, members: &[UserId]) -> Result<Vec<UserId>, PromptError> {
        let indices = self.pick_indices("Select users:", members).await?;
        Ok(indices.into_iter().map(|i| members[i].clone()).collect())
    }

    async fn confirm(&mut self, message: &str) -> Result<bool, PromptError> {
        loop {
            let line = self.read_line(&format!("{} [y/n]:", message)).await?;
            match line.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => println!("Answer y or n"),
            }
        }
    }

    fn report(&mut self, message: &str) {
        println!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_preserving_order() {
        assert_eq!(
            dedupe_preserving_order([0, 0, 2, 1, 2].into_iter()),
            vec![0, 2, 1]
        );
        assert_eq!(dedupe_preserving_order([1].into_iter()), vec![1]);
        assert!(dedupe_preserving_order(std::iter::empty()).is_empty());
    }
}
