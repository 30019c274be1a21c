// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Boundaries to the host platform
//!
//! Input devices, image decoding, audio playback and text shaping are
//! provided by the host. The core only sees the traits defined here, plus
//! small headless implementations used by tests and the demo runner.

pub mod assets;
pub mod audio;
pub mod font;
pub mod input;
