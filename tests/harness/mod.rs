// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Shared fixtures for feed integration tests.

#![allow(dead_code)]

pub mod collaborators;
pub mod fixtures;
