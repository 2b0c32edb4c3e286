// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

pub type JsonValue = serde_json::Value;
pub type JsonMap = serde_json::Map<String, JsonValue>;
