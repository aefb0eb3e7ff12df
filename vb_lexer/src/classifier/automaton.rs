//! Stack driver: epsilon loop, frame bookkeeping and recovery rules

use super::frames::{Action, Declarations, Flow, ForStep, Frame, Scope};
use super::{Block, ClassifierError, ClassifierErrorKind, ClassifierFlags, ExpressionClassifier};
use crate::config::compile_time::classifier::{MAX_EPSILON_STEPS, MAX_FRAME_DEPTH, MAX_RECORDED_ERRORS};
use crate::log_debug;
use crate::tokens::{Keyword, Token, TokenKind};

impl ExpressionClassifier {
    /// Offers `token` to the stack, or with `None` walks epsilon
    /// transitions until the top frame waits, and returns its flags.
    pub(super) fn advance(&mut self, token: Option<&Token>) -> ClassifierFlags {
        if let Some(token) = token {
            self.last_location = token.start;
        }

        let mut flags = ClassifierFlags::default();
        let mut steps = 0;
        loop {
            steps += 1;
            if steps > MAX_EPSILON_STEPS {
                log_debug!("Classifier step limit reached", "steps" => steps);
                self.limit_exceeded(token.map_or(TokenKind::Eof, |t| t.kind));
                break;
            }

            let Some(mut frame) = self.stack.pop() else {
                self.stack.push(Frame::Sentinel);
                continue;
            };

            let recovered = match token {
                Some(t) => self.recover(&mut frame, t),
                None => None,
            };
            let flow = match recovered {
                Some(flow) => flow,
                None => self.step(&mut frame, token),
            };

            let (consumed, action) = match flow {
                Flow::Wait => {
                    flags = frame.waiting_flags();
                    self.stack.push(frame);
                    break;
                }
                Flow::Consumed(action) => (true, action),
                Flow::Continue(action) => (false, action),
            };

            let refused = !self.apply(frame, action);
            if consumed || refused {
                break;
            }
        }
        flags
    }

    /// Applies `action` to the detached `frame`. Returns false when a push
    /// was refused at the depth limit.
    fn apply(&mut self, frame: Frame, action: Action) -> bool {
        match action {
            Action::Stay => {
                self.stack.push(frame);
                true
            }
            Action::Push(child) => {
                self.stack.push(frame);
                self.push(child)
            }
            Action::PushBoth(first, second) => {
                self.stack.push(frame);
                self.push(first) && self.push(second)
            }
            Action::Pop => {
                self.discard(&frame);
                true
            }
            Action::Replace(next) => {
                self.discard(&frame);
                self.push(next)
            }
        }
    }

    fn push(&mut self, frame: Frame) -> bool {
        if self.stack.len() >= MAX_FRAME_DEPTH {
            self.limit_exceeded(TokenKind::Eof);
            return false;
        }
        if let Some(context) = frame.context() {
            self.blocks.push(Block::new(context));
        }
        self.stack.push(frame);
        true
    }

    fn discard(&mut self, frame: &Frame) {
        if frame.context().is_some() {
            self.blocks.pop();
        }
    }

    /// Rules that apply before the frame's own step: end of file, unwinding
    /// after a mismatched `End`, `Next a, b` and forced statement ends.
    fn recover(&mut self, frame: &mut Frame, token: &Token) -> Option<Flow> {
        let is_sentinel = matches!(frame, Frame::Sentinel);

        if token.kind == TokenKind::Eof {
            if is_sentinel {
                self.pending_end = None;
                self.pending_next = false;
                self.end_statement = false;
                return Some(Flow::consume());
            }
            return Some(Flow::pop());
        }

        if let Some(keyword) = self.pending_end {
            if is_sentinel {
                self.pending_end = None;
                return Some(Flow::consume());
            }
            if frame.closing() == Some(keyword) {
                self.pending_end = None;
                return Some(Flow::Consumed(Action::Pop));
            }
            return Some(Flow::pop());
        }

        if self.pending_next {
            let in_statement_list = frame.is_statement_list();
            match frame {
                Frame::For(step) if *step == ForStep::Body => {
                    self.pending_next = false;
                    *step = ForStep::NextVariables;
                    return Some(Flow::retry());
                }
                Frame::Statements(statements) if statements.stops.contains(&Keyword::Next) => {
                    return Some(Flow::pop());
                }
                // No enclosing loop; the variable is left to the statement list
                _ if in_statement_list => self.pending_next = false,
                _ => return Some(Flow::pop()),
            }
        }

        if self.end_statement {
            if !frame.is_statement_list() {
                return Some(Flow::pop());
            }
            self.end_statement = false;
            frame.restart_line();
        }

        None
    }

    fn step(&mut self, frame: &mut Frame, token: Option<&Token>) -> Flow {
        match frame {
            Frame::Sentinel => match token {
                Some(t) if t.kind == TokenKind::Eof => Flow::consume(),
                _ => Flow::push(Frame::Declarations(Declarations::new(Scope::CompilationUnit))),
            },
            Frame::Declarations(d) => self.declarations(d, token),
            Frame::Attribute(step) => self.attribute(step, token),
            Frame::Imports(step) => self.imports(step, token),
            Frame::RestOfLine => match token {
                None => Flow::Wait,
                Some(t) if t.kind.is_terminator() => Flow::pop(),
                Some(_) => Flow::consume(),
            },
            Frame::SkipParens { depth } => match token.map(|t| t.kind) {
                None => Flow::Wait,
                Some(TokenKind::OpenParenthesis) => {
                    *depth += 1;
                    Flow::consume()
                }
                Some(TokenKind::CloseParenthesis) if *depth <= 1 => Flow::Consumed(Action::Pop),
                Some(TokenKind::CloseParenthesis) => {
                    *depth -= 1;
                    Flow::consume()
                }
                Some(_) => Flow::consume(),
            },
            Frame::TypeName(step) => self.type_name(step, token),
            Frame::Member(member) => self.member(member, token),
            Frame::Parameters(step) => self.parameters(step, token),
            Frame::Accessors(accessors) => self.accessors(accessors, token),
            Frame::EnumBody(step) => self.enum_body(step, token),
            Frame::Declarators(step) => self.declarators(step, token),
            Frame::Statements(statements) => self.statements(statements, token),
            Frame::Statement(step) => self.statement(step, token),
            Frame::If(step) => self.if_block(step, token),
            Frame::Select(step) => self.select_block(step, token),
            Frame::Loop(block) => self.loop_block(block, token),
            Frame::Do(step) => self.do_block(step, token),
            Frame::For(step) => self.for_block(step, token),
            Frame::Try(step) => self.try_block(step, token),
            Frame::OptionalExpression => self.optional_expression(token),
            Frame::ExpressionList(step) => self.expression_list(step, token),
            Frame::Expression(expression) => self.expression(expression, token),
            Frame::Group(group) => self.group(group, token),
            Frame::New(step) => self.new_expression(step, token),
            Frame::Lambda(lambda) => self.lambda(lambda, token),
            Frame::Query(query) => self.query(query, token),
            Frame::GetXmlNamespace(step) => self.xml_namespace(step, token),
            Frame::Xml(xml) => self.xml_literal(xml, token),
        }
    }

    /// Records `token` as misplaced in the current context
    pub(super) fn unexpected(&mut self, token: &Token) {
        self.record(ClassifierError {
            location: token.start,
            found: token.kind,
            context: self.context(),
            kind: ClassifierErrorKind::UnexpectedToken,
        });
    }

    fn limit_exceeded(&mut self, found: TokenKind) {
        self.record(ClassifierError {
            location: self.last_location,
            found,
            context: self.context(),
            kind: ClassifierErrorKind::LimitExceeded,
        });
    }

    fn record(&mut self, error: ClassifierError) {
        if self.errors.len() < MAX_RECORDED_ERRORS {
            self.errors.push(error);
        }
    }

    /// Remembers where an expression of the innermost block started
    pub(super) fn expression_started(&mut self, token: &Token) {
        if let Some(block) = self.blocks.last_mut() {
            block.last_expression_start = Some(token.start);
        }
    }

    pub(super) fn close_mismatched(&mut self, keyword: Keyword) {
        self.pending_end = Some(keyword);
    }

    pub(super) fn close_outer_for(&mut self) {
        self.pending_next = true;
    }

    pub(super) fn end_current_statement(&mut self) {
        self.end_statement = true;
    }
}

/// Keywords that may follow `End` to close a block
pub(super) fn is_block_keyword(keyword: Keyword) -> bool {
    matches!(
        keyword,
        Keyword::If
            | Keyword::Sub
            | Keyword::Function
            | Keyword::Select
            | Keyword::While
            | Keyword::With
            | Keyword::SyncLock
            | Keyword::Using
            | Keyword::Try
            | Keyword::Property
            | Keyword::Get
            | Keyword::Set
            | Keyword::Operator
            | Keyword::Event
            | Keyword::AddHandler
            | Keyword::RemoveHandler
            | Keyword::RaiseEvent
            | Keyword::Class
            | Keyword::Module
            | Keyword::Structure
            | Keyword::Interface
            | Keyword::Enum
            | Keyword::Namespace
    )
}

/// Identifiers and contextual keywords used as names
pub(super) fn is_name(kind: TokenKind) -> bool {
    match kind {
        TokenKind::Identifier => true,
        TokenKind::Keyword(keyword) => keyword.is_contextual(),
        _ => false,
    }
}

/// Anything that may follow `.` in a qualified name
pub(super) fn is_member_name(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Identifier | TokenKind::Keyword(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LookaheadClassifier;
    use crate::utils::Location;

    fn token(kind: TokenKind) -> Token {
        Token::symbol(kind, Location::new(1, 1), Location::new(1, 1))
    }

    #[test]
    fn test_first_inform_pushes_compilation_unit() {
        let mut classifier = ExpressionClassifier::new();
        assert_eq!(classifier.depth(), 1);
        let flags = classifier.inform(None);
        assert_eq!(flags, ClassifierFlags::default());
        assert_eq!(classifier.depth(), 2);
    }

    #[test]
    fn test_stray_end_at_top_level_is_swallowed() {
        let mut classifier = ExpressionClassifier::new();
        for kind in [
            TokenKind::Keyword(Keyword::End),
            TokenKind::Keyword(Keyword::Class),
            TokenKind::Eol,
        ] {
            classifier.advance(Some(&token(kind)));
        }
        assert_eq!(classifier.errors().len(), 1);
        assert_eq!(classifier.pending_end, None);
        assert_eq!(classifier.depth(), 2);
    }

    #[test]
    fn test_error_cap() {
        let mut classifier = ExpressionClassifier::new();
        for _ in 0..MAX_RECORDED_ERRORS + 5 {
            classifier.advance(Some(&token(TokenKind::Keyword(Keyword::Next))));
            classifier.advance(Some(&token(TokenKind::Eol)));
        }
        assert_eq!(classifier.errors().len(), MAX_RECORDED_ERRORS);
    }

    #[test]
    fn test_name_predicates() {
        assert!(is_name(TokenKind::Identifier));
        assert!(is_name(TokenKind::Keyword(Keyword::From)));
        assert!(!is_name(TokenKind::Keyword(Keyword::Dim)));
        assert!(is_member_name(TokenKind::Keyword(Keyword::Dim)));
        assert!(is_block_keyword(Keyword::SyncLock));
        assert!(!is_block_keyword(Keyword::Next));
    }
}
