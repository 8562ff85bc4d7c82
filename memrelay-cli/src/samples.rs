// Copyright 2025 Memrelay Contributors (https://github.com/memrelay)
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

//! Sample conversation data for the `seed` command. Deliberately rich
//! in extractable facts and preferences so the service's derivation
//! strategies have something to chew on.

/// A laptop-shopping conversation, one (user, assistant) exchange per
/// entry.
pub const SAMPLE_CONVERSATION: &[(&str, &str)] = &[
    (
        "Hi, I'm Alex, a software engineer based in Berlin.",
        "Hello Alex! Nice to meet you. How can I help today?",
    ),
    (
        "I'm looking for a laptop, budget around 1500 euros.",
        "Plenty of good options in that range. What will you mainly use it for?",
    ),
    (
        "Mostly programming, and I occasionally train small machine learning models.",
        "Then I'd recommend at least 16 GB of RAM. Any brand preference?",
    ),
    (
        "I like ThinkPads - great keyboards, and I run Linux on everything.",
        "A classic developer choice! The X1 Carbon line would suit you well.",
    ),
    (
        "Looks matter less to me than performance and build stability.",
        "Understood - the ThinkPad business line is known for exactly that.",
    ),
];

/// Standalone statements for quickly populating a semantic-fact
/// namespace.
pub const SAMPLE_FACTS: &[&str] = &[
    "User likes science fiction movies",
    "User prefers Python over Java",
    "User often debugs network issues",
    "User is exploring AI assistant tools",
    "User prefers dark UI themes",
    "User works with cloud infrastructure",
];
