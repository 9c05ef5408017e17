//! Expression parser.
//!
//! Grammar, from lowest to highest precedence:
//!
//! ```text
//! expression  := implication
//! implication := disjunction (IMPLIES implication)?
//! disjunction := conjunction (OR conjunction)*
//! conjunction := unary (AND unary)*
//! unary       := NOT unary | primary
//! primary     := atom | constant | '(' expression ')'
//! ```
//!
//! Implication is right-associative, conjunction and disjunction are left-associative.
//!
//! Accepted spellings:
//!
//! | Token   | Spellings               |
//! |---------|-------------------------|
//! | NOT     | `~` `!` `¬` `NOT`       |
//! | AND     | `^` `&` `*` `AND`       |
//! | OR      | `v` `\|` `+` `OR`       |
//! | IMPLIES | `->` `=>` `→` `IMPLIES` |
//! | TRUE    | `T` `TRUE`              |
//! | FALSE   | `F` `FALSE`             |
//!
//! Word keywords are case-insensitive. A lone `v` is always OR, so identifiers cannot start
//! with `v`.

use log::debug;

use crate::error::ParseError;
use crate::expr::Expr;
use crate::symbols::SymbolTable;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Atom(String),
    Const(bool),
    Not,
    And,
    Or,
    Implies,
    LParen,
    RParen,
    Eof,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            TokenKind::Atom(name) => format!("identifier '{}'", name),
            TokenKind::Const(true) => "'T'".to_string(),
            TokenKind::Const(false) => "'F'".to_string(),
            TokenKind::Not => "negation".to_string(),
            TokenKind::And => "conjunction".to_string(),
            TokenKind::Or => "disjunction".to_string(),
            TokenKind::Implies => "implication".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    position: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let next = chars.get(i + 1).copied();
        let kind = match c {
            '-' | '=' if next == Some('>') => {
                i += 2;
                TokenKind::Implies
            }
            '→' => {
                i += 1;
                TokenKind::Implies
            }
            '~' | '!' | '¬' => {
                i += 1;
                TokenKind::Not
            }
            '^' | '&' | '*' => {
                i += 1;
                TokenKind::And
            }
            'v' | '|' | '+' => {
                i += 1;
                TokenKind::Or
            }
            '(' => {
                i += 1;
                TokenKind::LParen
            }
            ')' => {
                i += 1;
                TokenKind::RParen
            }
            c if c.is_alphabetic() || c == '_' => {
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                match word.to_uppercase().as_str() {
                    "AND" => TokenKind::And,
                    "OR" => TokenKind::Or,
                    "NOT" => TokenKind::Not,
                    "IMPLIES" => TokenKind::Implies,
                    "T" | "TRUE" => TokenKind::Const(true),
                    "F" | "FALSE" => TokenKind::Const(false),
                    _ => TokenKind::Atom(word),
                }
            }
            c => return Err(ParseError::new(format!("Unexpected character '{}'", c), start)),
        };

        tokens.push(Token { kind, position: start });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        position: chars.len(),
    });
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    symbols: SymbolTable,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token stream always ends with Eof, which is never consumed.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        let token = self.peek();
        if token.kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(
                format!("Expected {}, found {}", kind.describe(), token.kind.describe()),
                token.position,
            ))
        }
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.implication()
    }

    fn implication(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.disjunction()?;
        if self.peek().kind == TokenKind::Implies {
            self.advance();
            let rhs = self.implication()?;
            return Ok(Expr::implies(lhs, rhs));
        }
        Ok(lhs)
    }

    fn disjunction(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.conjunction()?;
        while self.peek().kind == TokenKind::Or {
            self.advance();
            let rhs = self.conjunction()?;
            lhs = Expr::or(lhs, rhs);
        }
        Ok(lhs)
    }

    fn conjunction(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        while self.peek().kind == TokenKind::And {
            self.advance();
            let rhs = self.unary()?;
            lhs = Expr::and(lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.peek().kind == TokenKind::Not {
            self.advance();
            let operand = self.unary()?;
            return Ok(Expr::not(operand));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Atom(name) => Ok(Expr::Atom(self.symbols.intern(&name))),
            TokenKind::Const(value) => Ok(Expr::Const(value)),
            TokenKind::LParen => {
                let inner = self.expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Eof => Err(ParseError::new("Unexpected end of input", token.position)),
            other => Err(ParseError::new(format!("Unexpected {}", other.describe()), token.position)),
        }
    }
}

/// Parses `input` into an expression and the symbol table of its variables.
///
/// Every occurrence of the same variable name shares one table cell.
pub fn parse(input: &str) -> Result<(Expr, SymbolTable), ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::new("Empty expression", 0));
    }

    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        symbols: SymbolTable::new(),
    };
    let expr = parser.expression()?;

    let rest = parser.peek();
    if rest.kind != TokenKind::Eof {
        return Err(ParseError::new(
            format!("Unexpected {} after expression", rest.kind.describe()),
            rest.position,
        ));
    }

    debug!("parsed '{}' as {}", input, expr);
    Ok((expr, parser.symbols))
}

impl std::str::FromStr for Expr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s).map(|(expr, _)| expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn parsed(input: &str) -> String {
        parse(input).unwrap().0.to_string()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(parsed("p ^ q v r"), "((p ^ q) v r)");
        assert_eq!(parsed("p v q ^ r"), "(p v (q ^ r))");
        assert_eq!(parsed("p v q -> r"), "((p v q) → r)");
        assert_eq!(parsed("~p ^ q"), "((¬p) ^ q)");
        assert_eq!(parsed("~(p ^ q)"), "(¬(p ^ q))");
    }

    #[test]
    fn test_associativity() {
        assert_eq!(parsed("p -> q -> r"), "(p → (q → r))");
        assert_eq!(parsed("p ^ q ^ r"), "((p ^ q) ^ r)");
        assert_eq!(parsed("p v q v r"), "((p v q) v r)");
    }

    #[test]
    fn test_synonyms() {
        let expected = "((¬p) → (q ^ (r v s)))";
        assert_eq!(parsed("~p -> q ^ (r v s)"), expected);
        assert_eq!(parsed("!p => q & (r | s)"), expected);
        assert_eq!(parsed("¬p → q * (r + s)"), expected);
        assert_eq!(parsed("NOT p IMPLIES q AND (r OR s)"), expected);
        assert_eq!(parsed("not p implies q and (r or s)"), expected);
    }

    #[test]
    fn test_constants() {
        assert_eq!(parsed("T ^ F"), "(T ^ F)");
        assert_eq!(parsed("true v FALSE"), "(T v F)");
        assert_eq!(parsed("t"), "T");
        assert_eq!(parsed("T1"), "T1");
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(parsed("x1 ^ long_name"), "(x1 ^ long_name)");
        assert_eq!(parsed("_a"), "_a");
        assert_eq!(parsed("xv"), "xv");
    }

    #[test]
    fn test_shared_symbols() {
        let (expr, table) = parse("p ^ (q v p)").unwrap();
        assert_eq!(table.len(), 2);
        let Expr::And(l, r) = &expr else { panic!("expected conjunction") };
        let Expr::Or(_, rr) = &**r else { panic!("expected disjunction") };
        let (Expr::Atom(a), Expr::Atom(b)) = (&**l, &**rr) else { panic!("expected atoms") };
        assert!(std::sync::Arc::ptr_eq(a, b));
    }

    #[test]
    fn test_round_trip() {
        for input in ["p", "~~p", "(p ^ q) v (p ^ ~q)", "p -> (q -> r)", "~(T v x) ^ F"] {
            let once = parsed(input);
            assert_eq!(parsed(&once), once);
        }
    }

    #[test]
    fn test_errors() {
        let err = parse("").unwrap_err();
        assert_eq!(err.message, "Empty expression");
        assert_eq!(err.position, 0);
        assert_eq!(parse("   ").unwrap_err().message, "Empty expression");

        let err = parse("p ^ $").unwrap_err();
        assert_eq!(err.position, 4);
        assert!(err.message.contains('$'));

        let err = parse("(p ^ q").unwrap_err();
        assert_eq!(err.position, 6);

        let err = parse("p ^ q)").unwrap_err();
        assert_eq!(err.position, 5);

        let err = parse("p ^").unwrap_err();
        assert_eq!(err.message, "Unexpected end of input");

        assert!(parse("p q").is_err());
        assert!(parse("^ p").is_err());
        assert!(parse("()").is_err());
    }

    #[test]
    fn test_from_str() {
        let e: Expr = "p -> q".parse().unwrap();
        assert_eq!(e, Expr::implies(Expr::atom("p"), Expr::atom("q")));
    }
}
