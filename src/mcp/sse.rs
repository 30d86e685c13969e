//! Minimal `text/event-stream` decoding for Streamable-HTTP replies.

/// One dispatched server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// Event type; `None` means the default `message` type.
    pub event: Option<String>,
    /// Event data, with multiple `data:` lines joined by `\n`.
    pub data: String,
    /// Last event identifier, when one was sent.
    pub id: Option<String>,
}

impl SseEvent {
    /// Returns whether the event has the default `message` type.
    #[must_use]
    pub fn is_message(&self) -> bool {
        self.event.as_deref().is_none_or(|event| event == "message")
    }
}

/// Splits a complete event-stream body into events.
///
/// Comment lines and unknown fields are skipped. Events without data are
/// not dispatched. A trailing event without a terminating blank line is
/// still returned.
#[must_use]
pub fn parse_event_stream(body: &str) -> Vec<SseEvent> {
    let mut events = Vec::new();
    let mut current = SseEvent::default();
    let mut data_lines: Vec<&str> = Vec::new();

    for line in body.lines() {
        if line.is_empty() {
            dispatch(&mut events, &mut current, &mut data_lines);
            continue;
        }
        if line.starts_with(':') {
            continue;
        }

        let (field, value) = line.split_once(':').map_or((line, ""), |(field, rest)| {
            (field, rest.strip_prefix(' ').unwrap_or(rest))
        });
        match field {
            "event" => current.event = Some(value.to_owned()),
            "data" => data_lines.push(value),
            "id" => current.id = Some(value.to_owned()),
            _ => {}
        }
    }
    dispatch(&mut events, &mut current, &mut data_lines);
    events
}

fn dispatch(events: &mut Vec<SseEvent>, current: &mut SseEvent, data_lines: &mut Vec<&str>) {
    if data_lines.is_empty() {
        *current = SseEvent::default();
        return;
    }
    let mut event = std::mem::take(current);
    event.data = data_lines.join("\n");
    data_lines.clear();
    events.push(event);
}
