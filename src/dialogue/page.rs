/// Run of text sharing one set of active style tags (e.g. `red`).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextChunk {
    /// Chunk text; every `char` is one reveal step.
    pub text: String,
    /// Style tags active over the chunk, outermost first.
    pub tags: Vec<String>,
}

/// Inline control token, as produced by the markup parser.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawDirective {
    /// Directive name, e.g. `wait` or `sprite`.
    pub name: String,
    /// Whitespace-separated arguments.
    pub args: Vec<String>,
}

/// One element of a dialogue command stream.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DialogueCommand {
    /// Revealable text.
    Text(TextChunk),
    /// Start a new line; takes no reveal steps.
    LineBreak,
    /// Side effect fired when the reveal cursor reaches this point.
    Directive(RawDirective),
}

/// Chunk of the visible prefix of a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleChunk {
    /// Visible part of the chunk text.
    pub text: String,
    /// Style tags of the chunk.
    pub tags: Vec<String>,
}

/// Visible prefix of a page, split into lines of chunks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibleText {
    /// Lines in order; each line holds its visible chunks.
    pub lines: Vec<Vec<VisibleChunk>>,
}

impl VisibleText {
    /// Concatenated visible text without line breaks.
    pub fn raw_text(&self) -> String {
        self.lines
            .iter()
            .flatten()
            .map(|c| c.text.as_str())
            .collect()
    }
}

/// One text box worth of dialogue: an ordered command stream.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DialoguePage {
    commands: Vec<DialogueCommand>,
}

impl DialoguePage {
    /// Wrap a command stream produced by a markup parser.
    pub fn from_commands(commands: Vec<DialogueCommand>) -> Self {
        Self { commands }
    }

    /// Start building a page by hand.
    pub fn builder() -> DialoguePageBuilder {
        DialoguePageBuilder::default()
    }

    /// The command stream.
    pub fn commands(&self) -> &[DialogueCommand] {
        &self.commands
    }

    /// Number of reveal steps: the char count of all text chunks.
    pub fn total_chars(&self) -> usize {
        self.commands
            .iter()
            .map(|c| match c {
                DialogueCommand::Text(t) => t.text.chars().count(),
                _ => 0,
            })
            .sum()
    }

    /// Concatenation of all text chunks.
    pub fn raw_text(&self) -> String {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DialogueCommand::Text(t) => Some(t.text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Directives in stream order with the reveal position each sits at.
    ///
    /// The position is the number of characters preceding the directive; it fires once the reveal
    /// cursor reaches that count.
    pub fn directives(&self) -> Vec<(usize, &RawDirective)> {
        let mut pos = 0;
        let mut out = Vec::new();
        for c in &self.commands {
            match c {
                DialogueCommand::Text(t) => pos += t.text.chars().count(),
                DialogueCommand::LineBreak => {}
                DialogueCommand::Directive(d) => out.push((pos, d)),
            }
        }
        out
    }

    /// The part of the page shown when `count` characters are revealed.
    pub fn visible(&self, count: usize) -> VisibleText {
        let mut remaining = count;
        let mut lines: Vec<Vec<VisibleChunk>> = vec![Vec::new()];
        for c in &self.commands {
            if remaining == 0 {
                break;
            }
            match c {
                DialogueCommand::Text(t) => {
                    let n = t.text.chars().count();
                    if n == 0 {
                        continue;
                    }
                    let take = n.min(remaining);
                    remaining -= take;
                    if let Some(line) = lines.last_mut() {
                        line.push(VisibleChunk {
                            text: t.text.chars().take(take).collect(),
                            tags: t.tags.clone(),
                        });
                    }
                }
                DialogueCommand::LineBreak => lines.push(Vec::new()),
                DialogueCommand::Directive(_) => {}
            }
        }
        VisibleText { lines }
    }

    /// Tags of the latest visible chunk. Empty when nothing is visible yet.
    pub fn tags_at(&self, count: usize) -> &[String] {
        let mut remaining = count;
        let mut latest: &[String] = &[];
        for c in &self.commands {
            if remaining == 0 {
                break;
            }
            if let DialogueCommand::Text(t) = c {
                let n = t.text.chars().count();
                if n == 0 {
                    continue;
                }
                latest = &t.tags;
                remaining -= n.min(remaining);
            }
        }
        latest
    }
}

/// Hand-assembles a [`DialoguePage`].
#[derive(Clone, Debug, Default)]
pub struct DialoguePageBuilder {
    commands: Vec<DialogueCommand>,
}

impl DialoguePageBuilder {
    /// Append untagged text.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.styled(text, std::iter::empty::<String>())
    }

    /// Append text with style tags.
    pub fn styled<I, S>(mut self, text: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands.push(DialogueCommand::Text(TextChunk {
            text: text.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }));
        self
    }

    /// Append a line break.
    pub fn line_break(mut self) -> Self {
        self.commands.push(DialogueCommand::LineBreak);
        self
    }

    /// Append a directive.
    pub fn directive<I, S>(mut self, name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands.push(DialogueCommand::Directive(RawDirective {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }));
        self
    }

    /// Append a directive that takes no arguments.
    pub fn marker(self, name: impl Into<String>) -> Self {
        self.directive(name, std::iter::empty::<String>())
    }

    /// Finish the page.
    pub fn build(self) -> DialoguePage {
        DialoguePage::from_commands(self.commands)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dialogue/page.rs"]
mod tests;
