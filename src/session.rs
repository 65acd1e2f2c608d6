use std::io::{BufRead, Write};

use log::error;

use crate::catalog::{DestinationCatalog, SourceCatalog};
use crate::error::SessionResult;
use crate::progress::{InlineProgress, LineProgress};
use crate::prompt::Prompter;
use crate::reconciler::Reconciler;

const PROMPT: &str = "Enter a command (type 'help' for options): ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TransferPlaylists,
    TransferLikedSongs,
    TransferFollowedArtists,
    TransferAll,
    PreviewPlaylists,
    Help,
    Exit,
}

/// Accepted command strings
pub const COMMANDS: &[(&str, Command)] = &[
    ("transfer playlists", Command::TransferPlaylists),
    ("transfer liked songs", Command::TransferLikedSongs),
    ("transfer followed artists", Command::TransferFollowedArtists),
    ("transfer all", Command::TransferAll),
    ("preview playlists", Command::PreviewPlaylists),
    ("help", Command::Help),
    ("exit", Command::Exit),
    ("quit", Command::Exit),
    ("q", Command::Exit),
];

impl Command {
    /// Look up a command, ignoring case and surrounding whitespace
    pub fn parse(input: &str) -> Option<Command> {
        let input = input.trim().to_lowercase();
        COMMANDS
            .iter()
            .find(|(name, _)| *name == input)
            .map(|(_, command)| *command)
    }

    fn description(&self) -> &'static str {
        match self {
            Command::TransferPlaylists => "Recreate your Spotify playlists on YouTube Music",
            Command::TransferLikedSongs => "Like your saved Spotify songs on YouTube Music",
            Command::TransferFollowedArtists => {
                "Subscribe to the artists you follow on Spotify"
            }
            Command::TransferAll => "Run all three transfers in order",
            Command::PreviewPlaylists => "List your Spotify playlists without changing anything",
            Command::Help => "Show this list",
            Command::Exit => "Leave the program",
        }
    }
}

fn help_text() -> String {
    let mut lines = vec!["Available commands:".to_string()];
    for (name, command) in COMMANDS {
        lines.push(format!("  {:<28}{}", name, command.description()));
    }
    lines.join("\n")
}

/// Interactive command loop driving a [`Reconciler`]
pub struct Session<'a, S, D, R, W> {
    reconciler: Reconciler<'a, S, D>,
    prompter: Prompter<R, W>,
}

impl<'a, S, D, R, W> Session<'a, S, D, R, W>
where
    S: SourceCatalog,
    D: DestinationCatalog,
    R: BufRead,
    W: Write,
{
    /// Create a new Session instance
    pub fn new(reconciler: Reconciler<'a, S, D>, prompter: Prompter<R, W>) -> Self {
        Self {
            reconciler,
            prompter,
        }
    }

    /// Read and dispatch commands until `exit` or end of input
    pub async fn run(&mut self) -> SessionResult<()> {
        self.prompter.say(&help_text())?;
        loop {
            let Some(input) = self.prompter.ask(PROMPT)? else {
                self.prompter.say("")?;
                return Ok(());
            };
            match Command::parse(&input) {
                Some(command) => {
                    if !self.dispatch(command).await? {
                        return Ok(());
                    }
                }
                None => self
                    .prompter
                    .say("Invalid option. Type 'help' to see the available commands.")?,
            }
        }
    }

    /// Run one command. Returns `false` when the session should end.
    pub async fn dispatch(&mut self, command: Command) -> SessionResult<bool> {
        match command {
            Command::TransferPlaylists => {
                self.transfer_playlists().await?;
                self.prompter.say("Done!")?;
            }
            Command::TransferLikedSongs => {
                self.transfer_liked_songs().await?;
                self.prompter.say("Done!")?;
            }
            Command::TransferFollowedArtists => {
                self.transfer_followed_artists().await?;
                self.prompter.say("Done!")?;
            }
            Command::TransferAll => {
                self.transfer_playlists().await?;
                self.transfer_liked_songs().await?;
                self.transfer_followed_artists().await?;
                self.prompter.say("Done!")?;
            }
            Command::PreviewPlaylists => self.preview_playlists().await?,
            Command::Help => self.prompter.say(&help_text())?,
            Command::Exit => return Ok(false),
        }
        Ok(true)
    }

    async fn transfer_playlists(&mut self) -> SessionResult<()> {
        let mut progress = LineProgress::new(self.prompter.output());
        let result = self.reconciler.transfer_playlists(&mut progress).await;
        match result {
            Ok(report) => self.prompter.say(&report.format_summary())?,
            Err(e) => {
                error!("Playlist transfer aborted: {}", e);
                self.prompter.say(&format!("Transfer failed: {}", e))?;
            }
        }
        Ok(())
    }

    async fn transfer_liked_songs(&mut self) -> SessionResult<()> {
        let mut progress = InlineProgress::new(self.prompter.output());
        let result = self.reconciler.transfer_liked_songs(&mut progress).await;
        match result {
            Ok(report) => self.prompter.say(&report.format_summary())?,
            Err(e) => {
                error!("Liked songs transfer aborted: {}", e);
                self.prompter.say(&format!("Transfer failed: {}", e))?;
            }
        }
        Ok(())
    }

    async fn transfer_followed_artists(&mut self) -> SessionResult<()> {
        match self.reconciler.transfer_followed_artists().await {
            Ok(report) => self.prompter.say(&report.format_summary())?,
            Err(e) => {
                error!("Followed artists transfer aborted: {}", e);
                self.prompter.say(&format!("Transfer failed: {}", e))?;
            }
        }
        Ok(())
    }

    async fn preview_playlists(&mut self) -> SessionResult<()> {
        match self.reconciler.preview_playlists().await {
            Ok(previews) => {
                for preview in previews {
                    self.prompter.say(&preview.format_preview())?;
                }
                Ok(())
            }
            Err(e) => {
                error!("Playlist preview aborted: {}", e);
                self.prompter.say(&format!("Preview failed: {}", e))
            }
        }
    }

    pub fn into_prompter(self) -> Prompter<R, W> {
        self.prompter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrackRef;
    use crate::testing::{Call, FakeDestination, FakeSource};
    use std::io::Cursor;

    async fn run_session(source: &FakeSource, destination: &FakeDestination, input: &str) -> String {
        let prompter = Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let mut session = Session::new(Reconciler::new(source, destination), prompter);
        session.run().await.unwrap();
        String::from_utf8(session.into_prompter().into_output()).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("transfer playlists"), Some(Command::TransferPlaylists));
        assert_eq!(Command::parse("  Transfer Liked Songs "), Some(Command::TransferLikedSongs));
        assert_eq!(Command::parse("Q"), Some(Command::Exit));
        assert_eq!(Command::parse("quit"), Some(Command::Exit));
        assert_eq!(Command::parse("transfer"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = help_text();
        for (name, _) in COMMANDS {
            assert!(help.contains(name), "help is missing {}", name);
        }
    }

    #[tokio::test]
    async fn test_playlist_transfer_prints_progress_and_summary() {
        let source = FakeSource::new().with_playlist(
            "p1",
            "Road Trip",
            "",
            vec![TrackRef::new("A", "B")],
        );
        let destination = FakeDestination::new().with_song_result("A - B", "x1", "A", "B");

        let output = run_session(&source, &destination, "transfer playlists\nexit\n").await;

        assert!(output.contains("Adding A - B to Road Trip (100.00% completed)..."));
        assert!(output.contains("All playlists successfully transferred"));
        assert!(output.contains("Done!"));
    }

    #[tokio::test]
    async fn test_invalid_input_reprompts() {
        let source = FakeSource::new();
        let destination = FakeDestination::new();

        let output = run_session(&source, &destination, "dance\nhelp\nq\n").await;

        assert!(output.contains("Invalid option"));
        assert_eq!(output.matches(PROMPT).count(), 3);
        assert_eq!(output.matches("Available commands:").count(), 2);
    }

    #[tokio::test]
    async fn test_transfer_all_runs_every_reconciler() {
        let source = FakeSource::new()
            .with_playlist("p1", "Mix", "", vec![TrackRef::new("A", "B")])
            .with_saved_track("C", "D")
            .with_followed_artist("a1", "Pitbull");
        let destination = FakeDestination::new()
            .with_song_result("A - B", "x1", "A", "B")
            .with_song_result("C - D", "x2", "C", "D")
            .with_artist_result("Pitbull - Topic", "UCpit", "Pitbull");

        let output = run_session(&source, &destination, "transfer all\n").await;

        assert_eq!(destination.count_calls(|c| matches!(c, Call::Create { .. })), 1);
        assert!(destination.calls().contains(&Call::Like("x2".to_string())));
        assert!(destination
            .calls()
            .contains(&Call::Subscribe("UCpit".to_string())));
        assert!(output.contains("\rProgress: 100.00%..."));
        assert!(output.contains("Artists: 1 subscribed"));
        assert_eq!(output.matches("Done!").count(), 1);
        let liked_summary = output.find("Liked songs:").unwrap();
        let artists_summary = output.find("Artists: 1 subscribed").unwrap();
        assert!(output.find("Done!").unwrap() > artists_summary);
        assert!(liked_summary < artists_summary);
    }

    #[tokio::test]
    async fn test_preview_failure_keeps_session_alive() {
        let source = FakeSource::new()
            .with_playlist("p1", "Broken", "", vec![TrackRef::new("A", "B")])
            .with_unreadable_playlist("p1");
        let destination = FakeDestination::new();

        let output = run_session(&source, &destination, "preview playlists\nhelp\n").await;

        assert!(output.contains("Preview failed:"));
        assert_eq!(output.matches("Available commands:").count(), 2);
    }
}
