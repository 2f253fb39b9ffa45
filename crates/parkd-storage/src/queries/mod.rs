// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query functions grouped by table.

pub mod lots;
pub mod queue;
pub mod records;
pub mod spots;
pub mod users;
