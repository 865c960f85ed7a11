use crate::events::AppEvent;
use async_channel::Sender;
use orrery::CategoryId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

pub const SOCKET_PATH: &str = "/tmp/aeon.sock";

/// One control line: `select <id>`, `close` or `reload`.
pub fn parse_command(line: &str) -> Option<AppEvent> {
    let mut words = line.split_whitespace();
    let event = match (words.next()?, words.next()) {
        ("select", Some(id)) => AppEvent::Select(CategoryId::from(id)),
        ("close", None) => AppEvent::Close,
        ("reload", None) => AppEvent::ConfigReload,
        _ => return None,
    };
    words.next().is_none().then_some(event)
}

pub async fn run_server(tx: Sender<AppEvent>) {
    if std::fs::metadata(SOCKET_PATH).is_ok() {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        match parse_command(&line) {
                            Some(event) => {
                                let _ = tx.send(event).await;
                            }
                            None => log::warn!("Unknown control command '{}'", line.trim()),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert!(matches!(
            parse_command("select third-age"),
            Some(AppEvent::Select(id)) if id == CategoryId::from("third-age")
        ));
        assert!(matches!(parse_command("  close \n"), Some(AppEvent::Close)));
        assert!(matches!(parse_command("reload"), Some(AppEvent::ConfigReload)));
        assert!(parse_command("select").is_none());
        assert!(parse_command("close now").is_none());
        assert!(parse_command("select a b").is_none());
        assert!(parse_command("").is_none());
        assert!(parse_command("show").is_none());
    }
}
