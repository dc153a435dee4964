use std::io::stdout;
use std::path::Path;

use editor_command::Editor;
use ratatui::DefaultTerminal;
use ratatui::crossterm::ExecutableCommand;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

/// Hands the terminal to `$VISUAL`/`$EDITOR` for the snapshot and takes it back afterwards.
pub fn run_editor(terminal: &mut DefaultTerminal, path: &Path) -> std::io::Result<()> {
    let mut command = Editor::new().map_err(std::io::Error::other)?.open(path);
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;
    let status = command.status();
    stdout().execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    terminal.clear()?;
    let status = status?;
    if !status.success() {
        log::warn!("Editor exited with {status}");
    }
    Ok(())
}
