//! Opening links in the system browser.

use std::process::{Command, Stdio};

fn detached(program: &str) -> Command {
    let mut command = Command::new(program);
    // Keep the opener from writing over the terminal UI
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    command
}

/// Open `url` in a new browser window or tab (fire-and-forget).
pub fn open_url(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        detached("open").arg(url).spawn()?;
        return Ok(());
    }

    #[cfg(target_os = "linux")]
    {
        detached("xdg-open").arg(url).spawn()?;
        return Ok(());
    }

    #[cfg(target_os = "windows")]
    {
        detached("cmd").args(["/C", "start", "", url]).spawn()?;
        return Ok(());
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        let _ = detached;
        return Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            format!("no browser opener available for this platform: {}", url),
        ));
    }

    #[allow(unreachable_code)]
    Ok(())
}
