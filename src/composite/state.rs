//! Composite State Machine
//!
//! Phases of a composite read and the pure transition function between
//! them. Framing phases read the outline; content phases read the current
//! part.

/// Cursor a phase reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Outline,
    Part,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// `<agg:Root>`
    RootAggregateOpeningTag,
    /// `<agg:InputMessagePart_i>`
    MessagePartWrapperOpeningTag,
    /// First node of part `i`, its prolog skipped
    MessagePartDocumentElement,
    /// Remaining nodes of part `i`
    MessagePartContent,
    /// `</agg:InputMessagePart_i>`
    MessagePartWrapperClosingTag,
    /// `</agg:Root>`, then end of document
    RootAggregateClosingTag,
}

impl State {
    pub const INITIAL: State = State::RootAggregateOpeningTag;

    pub fn source(self) -> Source {
        match self {
            State::MessagePartDocumentElement | State::MessagePartContent => Source::Part,
            State::RootAggregateOpeningTag
            | State::MessagePartWrapperOpeningTag
            | State::MessagePartWrapperClosingTag
            | State::RootAggregateClosingTag => Source::Outline,
        }
    }

    /// Phase following `self`, given whether reading in `self` produced a
    /// node and whether parts remain after the current one
    pub fn next(self, produced: bool, more_parts: bool) -> State {
        match self {
            State::RootAggregateOpeningTag => State::MessagePartWrapperOpeningTag,
            State::MessagePartWrapperOpeningTag => State::MessagePartDocumentElement,
            State::MessagePartDocumentElement | State::MessagePartContent => {
                if produced {
                    State::MessagePartContent
                } else {
                    State::MessagePartWrapperClosingTag
                }
            }
            State::MessagePartWrapperClosingTag => {
                if more_parts {
                    State::MessagePartWrapperOpeningTag
                } else {
                    State::RootAggregateClosingTag
                }
            }
            State::RootAggregateClosingTag => State::RootAggregateClosingTag,
        }
    }

    /// Whether leaving `self` for `next` moves on to the following part
    pub fn advances_part(self, next: State) -> bool {
        self == State::MessagePartWrapperClosingTag && next == State::MessagePartWrapperOpeningTag
    }
}
