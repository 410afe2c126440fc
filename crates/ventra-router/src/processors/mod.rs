// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One processor per content type.

mod audio;
mod document;
mod image;
mod reaction;
mod sticker;
mod text;
mod video;

pub use audio::AudioProcessor;
pub use document::DocumentProcessor;
pub use image::ImageProcessor;
pub use reaction::ReactionProcessor;
pub use sticker::StickerProcessor;
pub use text::TextProcessor;
pub use video::VideoProcessor;
