//! This module provides the parser for machine definition files, utilizing the `pest` crate.
//! The grammar lives in `grammar.pest`; this module turns its parse tree into a validated
//! [`Definition`].
//!
//! ```text
//! name: Binary increment
//! states: q0, q1, qf
//! input: 0, 1
//! tape: 0, 1, _
//! blank: _
//! start: q0
//! accept: qf
//! rules:
//!   q0, 0, 0, R, q0
//!   q0, _, _, L, q1
//! ```

use crate::{
    definition::{Definition, DefinitionBuilder},
    types::{Direction, TuringMachineError, MAX_DEFINITION_SIZE},
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Position, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;

/// Derives a `PestParser` for the definition grammar in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct DefinitionParser;

/// A single transition rule, as written on one line: `state, read, write, direction, next`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRule {
    pub state: String,
    pub read: char,
    pub write: char,
    pub direction: Direction,
    pub next_state: String,
}

impl TransitionRule {
    /// Adds this rule to `builder`.
    pub fn apply(self, builder: DefinitionBuilder) -> DefinitionBuilder {
        builder.transition(
            self.state,
            self.read,
            self.write,
            self.direction,
            self.next_state,
        )
    }
}

/// Parses a complete definition and validates it.
///
/// # Arguments
///
/// * `input` - A string slice containing the machine definition.
///
/// # Returns
///
/// * `Ok(Definition)` if the input is well-formed and satisfies every invariant.
/// * `Err(TuringMachineError::ParseError)` for syntax errors, duplicate or missing sections.
/// * `Err(TuringMachineError::Configuration)` if the definition violates an invariant.
pub fn parse(input: &str) -> Result<Definition, TuringMachineError> {
    if input.len() > MAX_DEFINITION_SIZE {
        return Err(TuringMachineError::ParseError(Box::new(Error::new_from_pos(
            ErrorVariant::CustomError {
                message: format!(
                    "Definition is {} bytes, the maximum is {MAX_DEFINITION_SIZE}",
                    input.len()
                ),
            },
            Position::from_start(input),
        ))));
    }

    let root = parse_single(Rule::definition, input.trim())?;
    let builder = parse_definition(root)?;

    Ok(builder.build()?)
}

/// Parses one rule line in the form `q0, 1, X, R, q1`.
pub fn parse_rule(line: &str) -> Result<TransitionRule, TuringMachineError> {
    let root = parse_single(Rule::rule_line, line.trim())?;
    parse_transition(first_of(root, Rule::transition)?)
}

/// Parses a comma-separated list of state names. An empty line yields an empty list.
pub fn parse_states(line: &str) -> Result<Vec<String>, TuringMachineError> {
    let root = parse_single(Rule::states_line, line.trim())?;
    Ok(collect_states(root))
}

/// Parses a comma-separated list of single-character symbols.
pub fn parse_symbols(line: &str) -> Result<Vec<char>, TuringMachineError> {
    let root = parse_single(Rule::symbols_line, line.trim())?;
    collect_symbols(root)
}

/// Runs the pest parser for `rule` and returns its top-level pair.
fn parse_single(rule: Rule, input: &str) -> Result<Pair<'_, Rule>, TuringMachineError> {
    let mut pairs = DefinitionParser::parse(rule, input).map_err(Box::new)?;

    pairs.next().ok_or_else(|| {
        let start = Position::from_start(input);
        parse_error(&format!("Expected {rule:?}"), start.span(&start))
    })
}

/// Walks the top-level sections of a definition into a builder.
///
/// Each section may appear at most once; `states`, `tape` and `start` are required.
fn parse_definition(pair: Pair<Rule>) -> Result<DefinitionBuilder, TuringMachineError> {
    let whole = pair.as_span();
    let mut builder = Definition::builder();
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        builder = match rule {
            Rule::name => builder.name(first_of(p, Rule::text)?.as_str().trim()),
            Rule::states => builder.states(collect_states(p)),
            Rule::input => builder.input_alphabet(collect_symbols(p)?),
            Rule::tape => builder.tape_alphabet(collect_symbols(p)?),
            Rule::blank => builder.blank(to_symbol(&first_of(p, Rule::symbol)?)?),
            Rule::start => builder.initial_state(first_of(p, Rule::state)?.as_str()),
            Rule::accept => builder.accept_states(collect_states(p)),
            Rule::rules => parse_rules(p, builder)?,
            _ => builder, // EOI
        };
    }

    for (rule, name) in [
        (Rule::states, "states"),
        (Rule::tape, "tape"),
        (Rule::start, "start"),
    ] {
        if !seen.contains(&rule) {
            return Err(parse_error(&format!("Missing '{name}' section"), whole));
        }
    }

    Ok(builder)
}

/// Adds every rule of the `rules:` section to the builder.
fn parse_rules(
    pair: Pair<Rule>,
    mut builder: DefinitionBuilder,
) -> Result<DefinitionBuilder, TuringMachineError> {
    for rule_pair in pair.into_inner() {
        if rule_pair.as_rule() == Rule::transition {
            builder = parse_transition(rule_pair)?.apply(builder);
        }
    }

    Ok(builder)
}

/// Parses a single rule from a `Pair<Rule::transition>`.
fn parse_transition(pair: Pair<Rule>) -> Result<TransitionRule, TuringMachineError> {
    let span = pair.as_span();
    let parts: Vec<Pair<Rule>> = pair.into_inner().collect();

    let [state, read, write, direction, next] = parts.as_slice() else {
        return Err(parse_error("Malformed transition rule", span));
    };

    Ok(TransitionRule {
        state: state.as_str().to_string(),
        read: to_symbol(read)?,
        write: to_symbol(write)?,
        direction: direction.as_str().parse()?,
        next_state: next.as_str().to_string(),
    })
}

/// Collects every state name below `pair`.
fn collect_states(pair: Pair<Rule>) -> Vec<String> {
    pair.into_inner()
        .flatten()
        .filter(|p| p.as_rule() == Rule::state)
        .map(|p| p.as_str().to_string())
        .collect()
}

/// Collects every symbol below `pair`.
fn collect_symbols(pair: Pair<Rule>) -> Result<Vec<char>, TuringMachineError> {
    pair.into_inner()
        .flatten()
        .filter(|p| p.as_rule() == Rule::symbol)
        .map(|p| to_symbol(&p))
        .collect()
}

/// Returns the first descendant of `pair` matching `rule`.
fn first_of(pair: Pair<Rule>, rule: Rule) -> Result<Pair<Rule>, TuringMachineError> {
    let span = pair.as_span();
    pair.into_inner()
        .flatten()
        .find(|p| p.as_rule() == rule)
        .ok_or_else(|| parse_error(&format!("Expected {rule:?}"), span))
}

/// Converts a `symbol` pair into its single character.
fn to_symbol(pair: &Pair<Rule>) -> Result<char, TuringMachineError> {
    pair.as_str()
        .chars()
        .next()
        .ok_or_else(|| parse_error("Expected a symbol", pair.as_span()))
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Checks if a given section has already been declared.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), TuringMachineError> {
    if !matches!(
        rule,
        Rule::name
            | Rule::states
            | Rule::input
            | Rule::tape
            | Rule::blank
            | Rule::start
            | Rule::accept
            | Rule::rules
    ) {
        return Ok(());
    };

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{rule:?}:\" declaration"),
            span,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfigurationError;

    const INCREMENT: &str = r#"
# Adds one to a binary number.
name: Binary increment
states: q0, q1, qf
input: 0, 1
tape: 0, 1, _
blank: _
start: q0
accept: qf
rules:
  q0, 0, 0, R, q0
  q0, 1, 1, R, q0
  q0, _, _, L, q1   # found the end
  q1, 1, 0, L, q1
  q1, 0, 1, L, qf
  q1, _, 1, L, qf
"#;

    #[test]
    fn test_parse_complete_definition() {
        let definition = parse(INCREMENT).unwrap();

        assert_eq!(definition.name(), "Binary increment");
        assert_eq!(definition.states().len(), 3);
        assert_eq!(definition.input_alphabet().len(), 2);
        assert_eq!(definition.tape_alphabet().len(), 3);
        assert_eq!(definition.blank(), '_');
        assert_eq!(definition.initial_state(), "q0");
        assert!(definition.is_accepting("qf"));
        assert_eq!(definition.transition_count(), 6);

        let action = definition.transition("q1", '_').unwrap();
        assert_eq!(action.write, '1');
        assert_eq!(action.direction, Direction::Left);
        assert_eq!(action.next_state, "qf");
    }

    #[test]
    fn test_parse_defaults() {
        let input = r#"
states: q0
tape: a, _
start: q0
"#;
        let definition = parse(input).unwrap();

        assert_eq!(definition.name(), "untitled");
        assert_eq!(definition.blank(), '_');
        assert!(definition.input_alphabet().is_empty());
        assert!(definition.accept_states().is_empty());
        assert_eq!(definition.transition_count(), 0);
    }

    #[test]
    fn test_parse_sections_in_any_order() {
        let input = r#"
rules:
  a, x, y, r, b
start: a
tape: x, y, _   # comment
states: a, b
accept:
"#;
        let definition = parse(input).unwrap();

        assert_eq!(definition.transition_count(), 1);
        assert_eq!(
            definition.transition("a", 'x').unwrap().direction,
            Direction::Right
        );
    }

    #[test]
    fn test_parse_duplicate_section() {
        let input = r#"
states: q0
states: q1
tape: _
start: q0
"#;
        let error = parse(input).unwrap_err();

        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error
            .to_string()
            .contains("Duplicate \"states:\" declaration"));
    }

    #[test]
    fn test_parse_missing_section() {
        let input = r#"
states: q0
tape: _
"#;
        let error = parse(input).unwrap_err();

        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error.to_string().contains("Missing 'start' section"));
    }

    #[test]
    fn test_parse_syntax_error() {
        let result = parse("this is not a definition");
        assert!(matches!(result, Err(TuringMachineError::ParseError(_))));
    }

    #[test]
    fn test_parse_invalid_direction() {
        let input = r#"
states: q0
tape: _
start: q0
rules:
  q0, _, _, S, q0
"#;
        assert_eq!(
            parse(input).unwrap_err(),
            TuringMachineError::Configuration(ConfigurationError::InvalidDirection(
                "S".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_reports_configuration_errors() {
        let input = r#"
states: q0
tape: 0, _
start: q0
accept: qf
"#;
        assert_eq!(
            parse(input).unwrap_err(),
            TuringMachineError::Configuration(ConfigurationError::UnknownAcceptStates(vec![
                "qf".to_string()
            ]))
        );
    }

    #[test]
    fn test_parse_duplicate_transition() {
        let input = r#"
states: q0
tape: _
start: q0
rules:
  q0, _, _, R, q0
  q0, _, _, L, q0
"#;
        assert_eq!(
            parse(input).unwrap_err(),
            TuringMachineError::Configuration(ConfigurationError::DuplicateTransition(
                "q0".to_string(),
                '_'
            ))
        );
    }

    #[test]
    fn test_parse_oversized_definition() {
        let input = "#".repeat(MAX_DEFINITION_SIZE + 1);
        let error = parse(&input).unwrap_err();

        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error.to_string().contains("maximum"));
    }

    #[test]
    fn test_parse_rule_line() {
        assert_eq!(
            parse_rule("q0,1,X,R,q1").unwrap(),
            TransitionRule {
                state: "q0".to_string(),
                read: '1',
                write: 'X',
                direction: Direction::Right,
                next_state: "q1".to_string(),
            }
        );
        assert_eq!(
            parse_rule(" q1 , _ , 0 , l , qf ").unwrap().direction,
            Direction::Left
        );
        assert!(matches!(
            parse_rule("q0,1,X,R"),
            Err(TuringMachineError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_hash_symbol() {
        let input = r#"
# The tape uses '#' as a separator mark.
states: q0, qf   # two states
input: # none
tape: #, _
blank: #
start: q0
accept: qf
rules:
  q0, #, #, R, qf   # step over the mark
  #
"#;
        let definition = parse(input).unwrap();

        assert!(definition.input_alphabet().is_empty());
        assert_eq!(
            definition.tape_alphabet().iter().copied().collect::<Vec<_>>(),
            vec!['#', '_']
        );
        assert_eq!(definition.blank(), '#');

        let action = definition.transition("q0", '#').unwrap();
        assert_eq!(action.write, '#');
        assert_eq!(action.next_state, "qf");
    }

    #[test]
    fn test_parse_rule_line_with_hash() {
        let rule = parse_rule("q0,#,#,R,q1").unwrap();
        assert_eq!(rule.read, '#');
        assert_eq!(rule.write, '#');

        assert_eq!(parse_symbols("0,1,#,_").unwrap(), vec!['0', '1', '#', '_']);
        assert!(parse_symbols("0,#x").is_err());
    }

    #[test]
    fn test_parse_lists() {
        assert_eq!(parse_states("q0, q1,qf").unwrap(), vec!["q0", "q1", "qf"]);
        assert_eq!(parse_symbols("0,1, X ,_").unwrap(), vec!['0', '1', 'X', '_']);
        assert!(parse_states("").unwrap().is_empty());
        assert!(parse_symbols("01, 1").is_err());
    }
}
