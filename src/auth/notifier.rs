use async_trait::async_trait;
use tracing::{info, warn};

/// Out-of-band delivery of password reset tokens (e.g. email).
#[async_trait]
pub trait ResetNotifier: Send + Sync {
    async fn send_reset_token(&self, email: &str, token: &str) -> anyhow::Result<()>;
}

/// Stand-in for a mailer. Records that a token went out; the token itself is
/// only written when `RESET_TOKEN_LOG_DELIVERY` is switched on.
#[derive(Clone, Default)]
pub struct LogNotifier {
    reveal_token: bool,
}

impl LogNotifier {
    pub fn new(reveal_token: bool) -> Self {
        Self { reveal_token }
    }
}

#[async_trait]
impl ResetNotifier for LogNotifier {
    async fn send_reset_token(&self, email: &str, token: &str) -> anyhow::Result<()> {
        info!(%email, "password reset token issued");
        if self.reveal_token {
            warn!(%email, %token, "reset token (log delivery enabled)");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    async fn deliver(notifier: LogNotifier, token: &str) -> String {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter("contactboard=trace")
            .with_ansi(false)
            .with_writer(captured.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        notifier
            .send_reset_token("a@b.com", token)
            .await
            .expect("log delivery");
        captured.text()
    }

    #[tokio::test]
    async fn default_log_delivery_keeps_the_token_out_of_the_logs() {
        let out = deliver(LogNotifier::default(), "SECRETTOKEN12345").await;
        assert!(out.contains("password reset token issued"));
        assert!(out.contains("a@b.com"));
        assert!(!out.contains("SECRETTOKEN12345"));
    }

    #[tokio::test]
    async fn token_is_logged_only_when_enabled() {
        let out = deliver(LogNotifier::new(true), "SECRETTOKEN12345").await;
        assert!(out.contains("SECRETTOKEN12345"));
    }
}
