//! Purpose: Render pretty JSON with optional ANSI colorization for CLI output.
//! Exports: `colorize_json`.
//! Role: Small, pure formatter used by CLI emission paths.
//! Invariants: When color is disabled, output equals serde_json::to_string_pretty.
//! Invariants: ANSI escapes appear only when explicitly enabled.
use serde_json::{Map, Value};

const INDENT: &str = "  ";

// Plain 8/16-color codes; bright variants lose contrast on light themes.
const KEY: &str = "36";
const STR: &str = "32";
const NUM: &str = "33";
const BOOL: &str = "35";
const NULL: &str = "39";
const PUNCT: &str = "39";

pub fn colorize_json(value: &Value, use_color: bool) -> String {
    let mut painter = Painter {
        color: use_color,
        out: String::new(),
    };
    painter.value(value, 0);
    painter.out
}

struct Painter {
    color: bool,
    out: String,
}

impl Painter {
    fn value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Null => self.token("null", NULL),
            Value::Bool(true) => self.token("true", BOOL),
            Value::Bool(false) => self.token("false", BOOL),
            Value::Number(num) => {
                let text = num.to_string();
                self.token(&text, NUM);
            }
            Value::String(text) => self.string(text, STR),
            Value::Array(items) => self.array(items, depth),
            Value::Object(map) => self.object(map, depth),
        }
    }

    fn array(&mut self, items: &[Value], depth: usize) {
        if items.is_empty() {
            self.token("[]", PUNCT);
            return;
        }
        self.token("[", PUNCT);
        self.out.push('\n');
        let mut first = true;
        for item in items {
            if !first {
                self.token(",", PUNCT);
                self.out.push('\n');
            }
            first = false;
            self.indent(depth + 1);
            self.value(item, depth + 1);
        }
        self.out.push('\n');
        self.indent(depth);
        self.token("]", PUNCT);
    }

    fn object(&mut self, map: &Map<String, Value>, depth: usize) {
        if map.is_empty() {
            self.token("{}", PUNCT);
            return;
        }
        self.token("{", PUNCT);
        self.out.push('\n');
        let mut first = true;
        for (key, value) in map {
            if !first {
                self.token(",", PUNCT);
                self.out.push('\n');
            }
            first = false;
            self.indent(depth + 1);
            self.string(key, KEY);
            self.token(":", PUNCT);
            self.out.push(' ');
            self.value(value, depth + 1);
        }
        self.out.push('\n');
        self.indent(depth);
        self.token("}", PUNCT);
    }

    fn string(&mut self, text: &str, color: &str) {
        let encoded = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
        self.token(&encoded, color);
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
    }

    fn token(&mut self, text: &str, color: &str) {
        if !self.color {
            self.out.push_str(text);
            return;
        }
        self.out.push_str("\u{1b}[");
        self.out.push_str(color);
        self.out.push('m');
        self.out.push_str(text);
        self.out.push_str("\u{1b}[0m");
    }
}
