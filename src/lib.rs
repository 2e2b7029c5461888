//! Quill - handwriting practice backed by a hosted model
//!
//! This library provides:
//! - A drawing surface that turns pointer events into a PNG snapshot
//! - A gateway for speech synthesis and handwriting grading (Gemini)
//! - A relay server that keeps the model credential off the client
//! - A session controller tying words, drawing and feedback together
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              Drawing client                   │
//! │   Surface  │  Session  │  AudioSink           │
//! └──────────────────────┬───────────────────────┘
//!                        │ RelayClient (JSON)
//! ┌──────────────────────▼───────────────────────┐
//! │              Quill relay                      │
//! │   POST /api/gemini  │  GeminiClient (key)     │
//! └──────────────────────┬───────────────────────┘
//!                        │
//! ┌──────────────────────▼───────────────────────┐
//! │        Gemini generateContent                 │
//! │   TTS  │  Vision                              │
//! └──────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod canvas;
pub mod config;
pub mod error;
pub mod gateway;
pub mod session;
pub mod voice;

pub use canvas::{Pen, Point, Surface};
pub use config::Config;
pub use error::{Error, Result};
pub use gateway::{GeminiClient, InferenceGateway, RelayClient, Verdict};
pub use session::{Feedback, FeedbackKind, Session};
pub use voice::{AudioPlayback, AudioSink, MutedSink, PcmClip};
