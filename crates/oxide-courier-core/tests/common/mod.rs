#![allow(dead_code)]

use async_trait::async_trait;
use oxide_courier_core::{
    BotTransport, ChatAction, ChatRef, ChatResolver, MediaOptions, MediaSource, ResolveError,
    SendOptions, TransportError, TransportResult, Venue,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Route courier logs to the test output; `RUST_LOG=debug` shows queue activity.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// One transport call as seen by the fake.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub op: &'static str,
    pub chat: ChatRef,
    pub payload: String,
}

#[derive(Default)]
struct Script {
    delays: HashMap<String, u64>,
    failures: HashSet<String>,
}

/// Transport fake that records calls, with scripted latency and failures
/// keyed by payload.
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    finished: Mutex<Vec<String>>,
    script: Mutex<Script>,
    in_flight: Mutex<HashSet<ChatRef>>,
    overlaps: AtomicUsize,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(self, payload: &str, millis: u64) -> Self {
        self.script
            .lock()
            .expect("script")
            .delays
            .insert(payload.to_string(), millis);
        self
    }

    pub fn fail_on(self, payload: &str) -> Self {
        self.script
            .lock()
            .expect("script")
            .failures
            .insert(payload.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls").clone()
    }

    pub fn payloads(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.payload).collect()
    }

    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().expect("finished").clone()
    }

    /// Number of times a call started while another one for the same chat
    /// was still running.
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    async fn record(
        &self,
        op: &'static str,
        chat: ChatRef,
        payload: String,
    ) -> TransportResult<String> {
        let (delay, fail) = {
            let script = self.script.lock().expect("script");
            (
                script.delays.get(&payload).copied().unwrap_or(0),
                script.failures.contains(&payload),
            )
        };

        if !self.in_flight.lock().expect("in flight").insert(chat.clone()) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.calls.lock().expect("calls").push(Call {
            op,
            chat: chat.clone(),
            payload: payload.clone(),
        });

        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        self.in_flight.lock().expect("in flight").remove(&chat);
        self.finished.lock().expect("finished").push(payload.clone());

        if fail {
            Err(TransportError::message(format!("Bad Request: {op} failed")))
        } else {
            Ok(payload)
        }
    }
}

#[async_trait]
impl BotTransport for RecordingTransport {
    type Message = String;
    type Chat = ChatRef;
    type ChatMember = u64;
    type Me = String;

    async fn send_message(
        &self,
        chat: ChatRef,
        text: String,
        _options: SendOptions,
    ) -> TransportResult<String> {
        self.record("send_message", chat, text).await
    }

    async fn forward_message(
        &self,
        chat: ChatRef,
        from_chat: ChatRef,
        message_id: i32,
    ) -> TransportResult<String> {
        self.record("forward_message", chat, format!("{from_chat}/{message_id}"))
            .await
    }

    async fn send_photo(
        &self,
        chat: ChatRef,
        photo: MediaSource,
        _options: MediaOptions,
    ) -> TransportResult<String> {
        self.record("send_photo", chat, format!("{photo:?}")).await
    }

    async fn send_audio(
        &self,
        chat: ChatRef,
        audio: MediaSource,
        _options: MediaOptions,
    ) -> TransportResult<String> {
        self.record("send_audio", chat, format!("{audio:?}")).await
    }

    async fn send_document(
        &self,
        chat: ChatRef,
        document: MediaSource,
        _options: MediaOptions,
    ) -> TransportResult<String> {
        self.record("send_document", chat, format!("{document:?}")).await
    }

    async fn send_sticker(
        &self,
        chat: ChatRef,
        sticker: MediaSource,
        _options: MediaOptions,
    ) -> TransportResult<String> {
        self.record("send_sticker", chat, format!("{sticker:?}")).await
    }

    async fn send_video(
        &self,
        chat: ChatRef,
        video: MediaSource,
        _options: MediaOptions,
    ) -> TransportResult<String> {
        self.record("send_video", chat, format!("{video:?}")).await
    }

    async fn send_voice(
        &self,
        chat: ChatRef,
        voice: MediaSource,
        _options: MediaOptions,
    ) -> TransportResult<String> {
        self.record("send_voice", chat, format!("{voice:?}")).await
    }

    async fn send_location(
        &self,
        chat: ChatRef,
        latitude: f64,
        longitude: f64,
        _options: SendOptions,
    ) -> TransportResult<String> {
        self.record("send_location", chat, format!("{latitude},{longitude}"))
            .await
    }

    async fn send_venue(
        &self,
        chat: ChatRef,
        venue: Venue,
        _options: SendOptions,
    ) -> TransportResult<String> {
        self.record("send_venue", chat, venue.title).await
    }

    async fn send_game(
        &self,
        chat: ChatRef,
        game_short_name: String,
        _options: SendOptions,
    ) -> TransportResult<String> {
        self.record("send_game", chat, game_short_name).await
    }

    async fn send_chat_action(&self, chat: ChatRef, action: ChatAction) -> TransportResult<bool> {
        self.record("send_chat_action", chat, format!("{action:?}"))
            .await
            .map(|_| true)
    }

    async fn ban_chat_member(&self, chat: ChatRef, user_id: u64) -> TransportResult<bool> {
        self.record("ban_chat_member", chat, format!("ban:{user_id}"))
            .await
            .map(|_| true)
    }

    async fn unban_chat_member(&self, chat: ChatRef, user_id: u64) -> TransportResult<bool> {
        self.record("unban_chat_member", chat, format!("unban:{user_id}"))
            .await
            .map(|_| true)
    }

    async fn get_chat(&self, chat: ChatRef) -> TransportResult<ChatRef> {
        self.record("get_chat", chat.clone(), String::new())
            .await
            .map(|_| chat)
    }

    async fn get_chat_administrators(&self, chat: ChatRef) -> TransportResult<Vec<u64>> {
        self.record("get_chat_administrators", chat, String::new())
            .await
            .map(|_| vec![1, 2])
    }

    async fn get_chat_member_count(&self, chat: ChatRef) -> TransportResult<u32> {
        self.record("get_chat_member_count", chat, String::new())
            .await
            .map(|_| 3)
    }

    async fn get_chat_member(&self, chat: ChatRef, user_id: u64) -> TransportResult<u64> {
        self.record("get_chat_member", chat, String::new())
            .await
            .map(|_| user_id)
    }

    async fn leave_chat(&self, chat: ChatRef) -> TransportResult<bool> {
        self.record("leave_chat", chat, String::new())
            .await
            .map(|_| true)
    }

    async fn get_me(&self) -> TransportResult<String> {
        Ok("courier_bot".to_string())
    }

    async fn edit_message_text(
        &self,
        chat: ChatRef,
        _message_id: i32,
        text: String,
        _options: SendOptions,
    ) -> TransportResult<String> {
        self.record("edit_message_text", chat, text).await
    }

    async fn delete_message(&self, chat: ChatRef, message_id: i32) -> TransportResult<bool> {
        self.record("delete_message", chat, message_id.to_string())
            .await
            .map(|_| true)
    }
}

/// Resolver fake with a fixed directory and a per-call latency script.
#[derive(Clone, Default)]
pub struct ScriptedResolver {
    directory: Arc<HashMap<String, i64>>,
    latencies: Arc<Mutex<VecDeque<u64>>>,
    panics_on: Arc<HashSet<String>>,
    lookups: Arc<AtomicUsize>,
}

impl ScriptedResolver {
    pub fn new(entries: &[(&str, i64)]) -> Self {
        Self {
            directory: Arc::new(
                entries
                    .iter()
                    .map(|(name, id)| ((*name).to_string(), *id))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Latencies consumed by successive lookups, in call order.
    pub fn with_latencies(self, millis: &[u64]) -> Self {
        self.latencies
            .lock()
            .expect("latencies")
            .extend(millis.iter().copied());
        self
    }

    /// Make lookups of `username` panic.
    pub fn panicking_on(mut self, username: &str) -> Self {
        let mut panics_on = (*self.panics_on).clone();
        panics_on.insert(username.to_string());
        self.panics_on = Arc::new(panics_on);
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatResolver for ScriptedResolver {
    async fn resolve(&self, _token: &str, username: &str) -> Result<i64, ResolveError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let delay = self
            .latencies
            .lock()
            .expect("latencies")
            .pop_front()
            .unwrap_or(0);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        assert!(
            !self.panics_on.contains(username),
            "resolver backend crashed on {username}"
        );
        self.directory
            .get(username)
            .copied()
            .ok_or_else(|| ResolveError::NotFound(username.to_string()))
    }
}
