// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation debounce buffer.
//!
//! Rapid-fire messages from one person arrive as separate webhooks but
//! form one conversational turn. The buffer accumulates messages per
//! [`ConversationKey`] and flushes a batch when the conversation has been
//! idle past the debounce threshold, or unconditionally once the batch has
//! been accumulating for the hard ceiling. Every buffered message is
//! flushed in exactly one batch, in arrival order.

mod buffer;

pub use buffer::{BufferSettings, ConversationBuffer};
