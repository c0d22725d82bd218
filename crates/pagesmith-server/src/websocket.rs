//! WebSocket-based live reload.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Messages sent to preview clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Full page reload
    Reload,

    /// Connection established
    Connected,
}

/// Hub for broadcasting reload messages to all connected clients.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self { sender }
    }

    /// Send a message to all connected clients.
    pub fn send(&self, msg: ReloadMessage) {
        // No receivers is fine
        let _ = self.sender.send(msg);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }

    /// Number of connected clients.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Client script that reloads the page when the server says so.
pub fn reload_client_script(path: &str) -> String {
    format!(
        r#"(function() {{
  'use strict';

  const scheme = location.protocol === 'https:' ? 'wss://' : 'ws://';
  let attempts = 0;

  function connect() {{
    const ws = new WebSocket(scheme + location.host + '{path}');

    ws.onopen = function() {{
      if (attempts > 0) {{
        location.reload();
      }}
      attempts = 0;
    }};

    ws.onmessage = function(event) {{
      const msg = JSON.parse(event.data);
      if (msg.type === 'reload') {{
        location.reload();
      }}
    }};

    ws.onclose = function() {{
      if (attempts < 10) {{
        attempts++;
        setTimeout(connect, 1000 * attempts);
      }}
    }};
  }}

  connect();
}})();
"#
    )
}
