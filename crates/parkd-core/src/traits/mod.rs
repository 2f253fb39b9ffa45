// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams decoupling the core from its external collaborators.

pub mod mailer;
pub mod queue;

pub use mailer::Mailer;
pub use queue::JobQueue;
