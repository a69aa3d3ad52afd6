// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod content_hash;
pub mod errors;
pub mod telemetry;
pub mod web_content_processor;
