//! In-memory conversation history

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Model,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::System => "System",
            Role::User => "User",
            Role::Model => "Model",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Append-only turn history; turn 0 always holds the system instructions
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new(system_instructions: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn {
                role: Role::System,
                content: system_instructions.into(),
            }],
        }
    }

    pub fn system_instructions(&self) -> &str {
        &self.turns[0].content
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content);
    }

    pub fn push_model(&mut self, content: impl Into<String>) {
        self.push(Role::Model, content);
    }

    fn push(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(Turn {
            role,
            content: content.into(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Renders the history plus `new_turn` as a single prompt.
    ///
    /// ```text
    /// <preamble>
    ///
    /// Current dataset path: <path>
    /// User: ...
    /// Model: ...
    /// User: <new_turn>
    /// ```
    pub fn flatten(&self, preamble: &str, current_dataset: Option<&str>, new_turn: &str) -> String {
        let mut prompt = format!("{}\n\n", preamble);
        if let Some(path) = current_dataset {
            prompt.push_str(&format!("Current dataset path: {}\n", path));
        }
        for turn in self.turns.iter().filter(|t| t.role != Role::System) {
            prompt.push_str(&format!("{}: {}\n", turn.role, turn.content));
        }
        prompt.push_str(&format!("{}: {}\n", Role::User, new_turn));
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_holds_instructions() {
        let conversation = Conversation::new("be helpful");
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.turns()[0].role, Role::System);
        assert_eq!(conversation.system_instructions(), "be helpful");
    }

    #[test]
    fn test_flatten_without_dataset() {
        let conversation = Conversation::new("be helpful");
        let prompt = conversation.flatten("Preamble.", None, "hello");
        assert_eq!(prompt, "Preamble.\n\nUser: hello\n");
    }

    #[test]
    fn test_flatten_with_history() {
        let mut conversation = Conversation::new("be helpful");
        conversation.push_user("first question");
        conversation.push_model("first answer");

        let prompt = conversation.flatten("Preamble.", Some("data.csv"), "second question");
        assert_eq!(
            prompt,
            "Preamble.\n\n\
             Current dataset path: data.csv\n\
             User: first question\n\
             Model: first answer\n\
             User: second question\n"
        );
        // the system turn never appears in the flattened prompt
        assert!(!prompt.contains("be helpful"));
    }
}
