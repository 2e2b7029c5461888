//! Shared test utilities
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quill_gateway::{AudioSink, Error, InferenceGateway, PcmClip, Point, Result, Session};
use tokio::net::TcpListener;
use tokio::sync::Notify;

/// Gateway with canned replies that counts its calls
#[derive(Default)]
pub struct FakeGateway {
    /// `None` makes `pronounce` fail
    pub audio: Option<Vec<u8>>,
    /// `None` makes `grade` fail
    pub answer: Option<String>,
    /// When set, both operations wait for a permit before answering
    pub gate: Option<Arc<Notify>>,
    pub pronounce_calls: AtomicUsize,
    pub grade_calls: AtomicUsize,
    pub graded: Mutex<Vec<(String, String)>>,
}

impl FakeGateway {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            ..Self::default()
        }
    }

    pub fn speaking(audio: Vec<u8>) -> Self {
        Self {
            audio: Some(audio),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn gated(answer: &str, gate: Arc<Notify>) -> Self {
        Self {
            answer: Some(answer.to_string()),
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn gated_speaking(audio: Vec<u8>, gate: Arc<Notify>) -> Self {
        Self {
            audio: Some(audio),
            gate: Some(gate),
            ..Self::default()
        }
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }

    pub fn pronounce_calls(&self) -> usize {
        self.pronounce_calls.load(Ordering::SeqCst)
    }

    pub fn grade_calls(&self) -> usize {
        self.grade_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceGateway for FakeGateway {
    async fn pronounce(&self, _word: &str) -> Result<Vec<u8>> {
        self.pronounce_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_for_gate().await;
        self.audio
            .clone()
            .ok_or_else(|| Error::Gateway("upstream 503 with key abc123".to_string()))
    }

    async fn grade(&self, image_data_url: &str, word: &str) -> Result<String> {
        self.grade_calls.fetch_add(1, Ordering::SeqCst);
        self.graded
            .lock()
            .unwrap()
            .push((image_data_url.to_string(), word.to_string()));

        self.wait_for_gate().await;

        self.answer
            .clone()
            .ok_or_else(|| Error::Gateway("upstream 500".to_string()))
    }
}

/// Audio sink that remembers what it was asked to play
#[derive(Default)]
pub struct RecordingSink {
    pub clips: Mutex<Vec<PcmClip>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn played(&self) -> usize {
        self.clips.lock().unwrap().len()
    }
}

#[async_trait]
impl AudioSink for RecordingSink {
    async fn play(&self, clip: &PcmClip) -> Result<()> {
        if self.fail {
            return Err(Error::Audio("device unplugged".to_string()));
        }
        self.clips.lock().unwrap().push(clip.clone());
        Ok(())
    }
}

/// Practice words in their default order
pub fn default_words() -> Vec<String> {
    ["air", "water", "shelter", "food"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Build a session over shared fakes
pub fn session_with(gateway: Arc<FakeGateway>, sink: Arc<RecordingSink>) -> Session {
    Session::new(default_words(), gateway, sink).expect("failed to create session")
}

/// Draw a horizontal stroke across the middle of the surface
pub async fn scribble(session: &Session) {
    session.pointer_down(Point::new(30.0, 100.0)).await;
    session.pointer_move(Point::new(120.0, 90.0)).await;
    session.pointer_move(Point::new(250.0, 110.0)).await;
    session.pointer_up().await;
}

/// Serve a router on an ephemeral local port
pub async fn spawn_server(router: axum::Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("no local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server failed");
    });
    addr
}
