use std::fmt;

use nova_interop_descriptors::Variance;

use super::AltSignatureError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AltDeclaration {
    Function(AltFunction),
    Property(AltProperty),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltFunction {
    pub type_params: Vec<AltTypeParam>,
    pub name: String,
    pub params: Vec<AltParam>,
    /// `None` when the declaration omits `: Type`.
    pub return_type: Option<AltType>,
}

/// Bounds from `<T : A>` and from a trailing `where T : B` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltTypeParam {
    pub name: String,
    pub bounds: Vec<AltType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltParam {
    pub name: String,
    pub vararg: bool,
    /// Element type for varargs.
    pub ty: AltType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltProperty {
    pub is_var: bool,
    pub name: String,
    pub ty: AltType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltType {
    pub kind: AltTypeKind,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AltTypeKind {
    /// Possibly qualified class name, or a type parameter name.
    Named {
        name: String,
        arguments: Vec<AltArgument>,
    },
    /// `(A, B) -> R`
    Function {
        params: Vec<AltType>,
        ret: Box<AltType>,
    },
    /// `#(A, B)`
    Tuple(Vec<AltType>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AltArgument {
    Star,
    Projected(Variance, AltType),
}

impl fmt::Display for AltType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AltTypeKind::Named { name, arguments } => {
                f.write_str(name)?;
                if !arguments.is_empty() {
                    f.write_str("<")?;
                    for (idx, argument) in arguments.iter().enumerate() {
                        if idx > 0 {
                            f.write_str(", ")?;
                        }
                        match argument {
                            AltArgument::Star => f.write_str("*")?,
                            AltArgument::Projected(Variance::Invariant, ty) => write!(f, "{ty}")?,
                            AltArgument::Projected(variance, ty) => {
                                write!(f, "{} {ty}", variance.label())?
                            }
                        }
                    }
                    f.write_str(">")?;
                }
            }
            AltTypeKind::Function { params, ret } => {
                f.write_str("(")?;
                write_list(f, params)?;
                write!(f, ") -> {ret}")?;
            }
            AltTypeKind::Tuple(items) => {
                f.write_str("#(")?;
                write_list(f, items)?;
                f.write_str(")")?;
            }
        }
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[AltType]) -> fmt::Result {
    for (idx, ty) in types.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}

/// Parses `fun <T : A> name(p: Type): Type`, `val name: Type` or `var name: Type`.
pub fn parse_alt_declaration(text: &str) -> Result<AltDeclaration, AltSignatureError> {
    let mut parser = Parser { text, pos: 0 };
    let declaration = parser.parse_declaration()?;
    parser.skip_ws();
    if !parser.is_eof() {
        return Err(parser.error("unexpected trailing text"));
    }
    Ok(declaration)
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn parse_declaration(&mut self) -> Result<AltDeclaration, AltSignatureError> {
        if self.consume_keyword("fun") {
            return self.parse_function().map(AltDeclaration::Function);
        }
        let is_var = if self.consume_keyword("var") {
            true
        } else if self.consume_keyword("val") {
            false
        } else {
            return Err(self.error("expected `fun`, `val` or `var`"));
        };
        let name = self.expect_ident()?;
        self.expect_char(':')?;
        let ty = self.parse_type()?;
        Ok(AltDeclaration::Property(AltProperty { is_var, name, ty }))
    }

    fn parse_function(&mut self) -> Result<AltFunction, AltSignatureError> {
        let mut type_params = Vec::new();
        if self.consume_char('<') {
            loop {
                let name = self.expect_ident()?;
                let mut bounds = Vec::new();
                if self.consume_char(':') {
                    bounds.push(self.parse_type()?);
                }
                type_params.push(AltTypeParam { name, bounds });
                if self.consume_char('>') {
                    break;
                }
                self.expect_char(',')?;
            }
        }

        let name = self.expect_ident()?;
        self.expect_char('(')?;
        let mut params = Vec::new();
        if !self.consume_char(')') {
            loop {
                let vararg = self.consume_keyword("vararg");
                let name = self.expect_ident()?;
                self.expect_char(':')?;
                let ty = self.parse_type()?;
                params.push(AltParam { name, vararg, ty });
                if self.consume_char(')') {
                    break;
                }
                self.expect_char(',')?;
            }
        }

        let return_type = if self.consume_char(':') {
            Some(self.parse_type()?)
        } else {
            None
        };

        if self.consume_keyword("where") {
            loop {
                let start = self.pos;
                let param = self.expect_ident()?;
                self.expect_char(':')?;
                let bound = self.parse_type()?;
                match type_params.iter_mut().find(|p| p.name == param) {
                    Some(type_param) => type_param.bounds.push(bound),
                    None => {
                        return Err(AltSignatureError::Syntax {
                            offset: start,
                            message: format!("unknown type parameter `{param}` in where clause"),
                        })
                    }
                }
                if !self.consume_char(',') {
                    break;
                }
            }
        }

        Ok(AltFunction {
            type_params,
            name,
            params,
            return_type,
        })
    }

    fn parse_type(&mut self) -> Result<AltType, AltSignatureError> {
        let kind = if self.consume_str("#(") {
            AltTypeKind::Tuple(self.parse_type_list(')')?)
        } else if self.consume_char('(') {
            let mut types = self.parse_type_list(')')?;
            if self.consume_str("->") {
                let ret = self.parse_type()?;
                AltTypeKind::Function {
                    params: types,
                    ret: Box::new(ret),
                }
            } else if types.len() == 1 {
                // Parenthesized type, e.g. `((Int) -> Unit)?`.
                let inner = types.remove(0);
                let nullable = self.consume_char('?');
                return Ok(AltType {
                    nullable: inner.nullable || nullable,
                    kind: inner.kind,
                });
            } else {
                return Err(self.error("expected `->` after parameter types"));
            }
        } else {
            let mut name = self.expect_ident()?;
            while self.peek_non_ws_char() == Some('.') {
                self.consume_char('.');
                name.push('.');
                name.push_str(&self.expect_ident()?);
            }
            let mut arguments = Vec::new();
            if self.consume_char('<') {
                loop {
                    arguments.push(self.parse_argument()?);
                    if self.consume_char('>') {
                        break;
                    }
                    self.expect_char(',')?;
                }
            }
            AltTypeKind::Named { name, arguments }
        };
        let nullable = self.consume_char('?');
        Ok(AltType { kind, nullable })
    }

    fn parse_type_list(&mut self, close: char) -> Result<Vec<AltType>, AltSignatureError> {
        let mut types = Vec::new();
        if self.consume_char(close) {
            return Ok(types);
        }
        loop {
            types.push(self.parse_type()?);
            if self.consume_char(close) {
                return Ok(types);
            }
            self.expect_char(',')?;
        }
    }

    fn parse_argument(&mut self) -> Result<AltArgument, AltSignatureError> {
        if self.consume_char('*') {
            return Ok(AltArgument::Star);
        }
        let variance = if self.consume_keyword("in") {
            Variance::In
        } else if self.consume_keyword("out") {
            Variance::Out
        } else {
            Variance::Invariant
        };
        Ok(AltArgument::Projected(variance, self.parse_type()?))
    }

    // --- lexing helpers ------------------------------------------------------

    fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn rest(&self) -> &str {
        self.text.get(self.pos..).unwrap_or("")
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_non_ws_char(&self) -> Option<char> {
        self.rest().chars().find(|ch| !ch.is_whitespace())
    }

    fn bump_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.bump_char();
            } else {
                break;
            }
        }
    }

    fn consume_char(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek_char() == Some(expected) {
            self.bump_char();
            true
        } else {
            false
        }
    }

    fn consume_str(&mut self, s: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Keywords must end at a token boundary: `input` is an identifier, not `in`.
    fn consume_keyword(&mut self, kw: &str) -> bool {
        self.skip_ws();
        let Some(after) = self.rest().strip_prefix(kw) else {
            return false;
        };
        if after.chars().next().is_some_and(is_ident_part) {
            return false;
        }
        self.pos += kw.len();
        true
    }

    fn expect_char(&mut self, expected: char) -> Result<(), AltSignatureError> {
        if self.consume_char(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected `{expected}`")))
        }
    }

    fn expect_ident(&mut self) -> Result<String, AltSignatureError> {
        self.skip_ws();
        let start = self.pos;
        let mut chars = self.rest().char_indices();
        match chars.next() {
            Some((_, first)) if is_ident_start(first) => {}
            _ => return Err(self.error("expected identifier")),
        }
        let len = chars
            .find(|(_, ch)| !is_ident_part(*ch))
            .map(|(idx, _)| idx)
            .unwrap_or(self.rest().len());
        self.pos = start + len;
        Ok(self.text[start..self.pos].to_string())
    }

    fn error(&self, message: &str) -> AltSignatureError {
        AltSignatureError::Syntax {
            offset: self.pos,
            message: message.to_string(),
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

fn is_ident_part(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, nullable: bool) -> AltType {
        AltType {
            kind: AltTypeKind::Named {
                name: name.to_string(),
                arguments: Vec::new(),
            },
            nullable,
        }
    }

    #[test]
    fn parses_generic_function() {
        let parsed =
            parse_alt_declaration("fun <T : Comparable<T>> max(vararg items: T): T?").unwrap();
        let AltDeclaration::Function(function) = parsed else {
            panic!("expected a function");
        };
        assert_eq!(function.name, "max");
        assert_eq!(function.type_params.len(), 1);
        assert_eq!(
            function.type_params[0].bounds[0].to_string(),
            "Comparable<T>"
        );
        assert!(function.params[0].vararg);
        assert_eq!(function.params[0].ty, named("T", false));
        assert_eq!(function.return_type, Some(named("T", true)));
    }

    #[test]
    fn parses_function_and_tuple_types() {
        let parsed =
            parse_alt_declaration("fun run(action: ((String) -> Unit)?, pair: #(Int, List<*>))")
                .unwrap();
        let AltDeclaration::Function(function) = parsed else {
            panic!("expected a function");
        };
        assert_eq!(function.return_type, None);
        assert_eq!(function.params[0].ty.to_string(), "(String) -> Unit?");
        assert!(function.params[0].ty.nullable);
        assert!(parse_alt_declaration("fun f(p: #(Int, out List<*>))").is_err());
    }

    #[test]
    fn keywords_need_a_boundary() {
        let parsed = parse_alt_declaration("var input: MutableList<in String>").unwrap();
        assert_eq!(
            parsed,
            AltDeclaration::Property(AltProperty {
                is_var: true,
                name: "input".to_string(),
                ty: AltType {
                    kind: AltTypeKind::Named {
                        name: "MutableList".to_string(),
                        arguments: vec![AltArgument::Projected(
                            Variance::In,
                            named("String", false)
                        )],
                    },
                    nullable: false,
                },
            })
        );
    }

    #[test]
    fn where_clause_adds_bounds() {
        let parsed =
            parse_alt_declaration("fun <T> sort(list: List<T>) where T : Comparable<T>, T : Any")
                .unwrap();
        let AltDeclaration::Function(function) = parsed else {
            panic!("expected a function");
        };
        assert_eq!(function.type_params[0].bounds.len(), 2);
    }

    #[test]
    fn reports_offset_of_syntax_errors() {
        assert_eq!(
            parse_alt_declaration("fun f(p Int)"),
            Err(AltSignatureError::Syntax {
                offset: 8,
                message: "expected `:`".to_string(),
            })
        );
        assert!(parse_alt_declaration("val x: Int extra").is_err());
    }
}
