use crate::error::{Error, Result};
use crate::names::ClassName;
use crate::sink::{BaseType, TypeArgument, TypeSink, Variance};

/// A formal type parameter whose bounds have been validated but not decoded yet.
///
/// Declarations allocate one placeholder per parameter first and only then decode
/// the bounds, so `<T:Ljava/lang/Comparable<TT;>;>` can refer to itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormalTypeParameter<'s> {
    pub name: &'s str,
    pub variance: Variance,
    pub reified: bool,
    bounds: Vec<&'s str>,
}

impl<'s> FormalTypeParameter<'s> {
    pub fn bounds(&self) -> &[&'s str] {
        &self.bounds
    }

    pub fn decode_bounds<S: TypeSink>(
        &self,
        sink: &mut S,
    ) -> std::result::Result<Vec<S::Output>, S::Error> {
        self.bounds.iter().map(|bound| decode_type(bound, sink)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature<'s> {
    pub type_parameters: Vec<FormalTypeParameter<'s>>,
    /// Superclass first, then interfaces.
    supertypes: Vec<&'s str>,
}

impl<'s> ClassSignature<'s> {
    pub fn supertypes(&self) -> &[&'s str] {
        &self.supertypes
    }

    pub fn decode_supertypes<S: TypeSink>(
        &self,
        sink: &mut S,
    ) -> std::result::Result<Vec<S::Output>, S::Error> {
        self.supertypes.iter().map(|ty| decode_type(ty, sink)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature<'s> {
    pub type_parameters: Vec<FormalTypeParameter<'s>>,
    parameters: Vec<&'s str>,
    /// `None` for `V`.
    return_type: Option<&'s str>,
    exceptions: Vec<&'s str>,
}

impl<'s> MethodSignature<'s> {
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameters(&self) -> &[&'s str] {
        &self.parameters
    }

    pub fn return_type(&self) -> Option<&'s str> {
        self.return_type
    }

    pub fn returns_void(&self) -> bool {
        self.return_type.is_none()
    }

    pub fn exception_count(&self) -> usize {
        self.exceptions.len()
    }

    pub fn decode_parameters<S: TypeSink>(
        &self,
        sink: &mut S,
    ) -> std::result::Result<Vec<S::Output>, S::Error> {
        self.parameters.iter().map(|ty| decode_type(ty, sink)).collect()
    }

    pub fn decode_return_type<S: TypeSink>(
        &self,
        sink: &mut S,
    ) -> std::result::Result<Option<S::Output>, S::Error> {
        self.return_type.map(|ty| decode_type(ty, sink)).transpose()
    }
}

pub fn parse_class_signature(sig: &str) -> Result<ClassSignature<'_>> {
    let mut cursor = Cursor::new(sig);
    let type_parameters = cursor.formal_type_parameters()?;

    let mut supertypes = Vec::new();
    while !cursor.at_end() {
        if cursor.peek() != Some(b'L') {
            return Err(cursor.unexpected("class type"));
        }
        supertypes.push(cursor.skim_type()?);
    }
    if supertypes.is_empty() {
        return Err(cursor.unexpected("superclass"));
    }

    Ok(ClassSignature {
        type_parameters,
        supertypes,
    })
}

pub fn parse_method_signature(sig: &str) -> Result<MethodSignature<'_>> {
    let mut cursor = Cursor::new(sig);
    let type_parameters = cursor.formal_type_parameters()?;

    cursor.expect(b'(', "`(`")?;
    let mut parameters = Vec::new();
    while !cursor.eat(b')') {
        parameters.push(cursor.skim_type()?);
    }

    let return_type = if cursor.eat(b'V') {
        None
    } else {
        Some(cursor.skim_type()?)
    };

    // Thrown types are validated and kept for completeness; nothing consumes them.
    let mut exceptions = Vec::new();
    while cursor.eat(b'^') {
        exceptions.push(cursor.skim_type()?);
    }
    cursor.finish()?;

    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
        exceptions,
    })
}

/// Parses a standalone `<...>` formal type parameter list.
pub fn parse_formal_type_parameters(sig: &str) -> Result<Vec<FormalTypeParameter<'_>>> {
    let mut cursor = Cursor::new(sig);
    let params = cursor.formal_type_parameters()?;
    cursor.finish()?;
    Ok(params)
}

/// Decodes one complete type signature, driving `sink` bottom-up.
pub fn decode_type<S: TypeSink>(
    sig: &str,
    sink: &mut S,
) -> std::result::Result<S::Output, S::Error> {
    let mut cursor = Cursor::new(sig);
    let out = cursor.decode(sink)?;
    cursor.finish()?;
    Ok(out)
}

/// Checks that `sig` is exactly one well-formed type signature.
pub fn validate_type(sig: &str) -> Result<()> {
    let mut cursor = Cursor::new(sig);
    cursor.skip_type()?;
    cursor.finish()
}

struct Cursor<'s> {
    sig: &'s str,
    pos: usize,
}

impl<'s> Cursor<'s> {
    fn new(sig: &'s str) -> Self {
        Self { sig, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.sig.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.sig.len()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.sig[self.pos..].starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, b: u8, expected: &'static str) -> Result<()> {
        if self.eat(b) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(Error::TrailingInput {
                signature: self.sig.to_string(),
                offset: self.pos,
            })
        }
    }

    fn unexpected(&self, expected: &'static str) -> Error {
        match self.sig[self.pos..].chars().next() {
            Some(found) => Error::UnexpectedChar {
                signature: self.sig.to_string(),
                offset: self.pos,
                found,
                expected,
            },
            None => Error::UnexpectedEnd {
                signature: self.sig.to_string(),
                expected,
            },
        }
    }

    /// Consumes bytes up to (not including) the first of `stops`; must be non-empty.
    fn identifier(&mut self, stops: &[u8]) -> Result<&'s str> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if stops.contains(&b) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(Error::EmptyIdentifier {
                signature: self.sig.to_string(),
                offset: start,
            });
        }
        Ok(&self.sig[start..self.pos])
    }

    fn formal_type_parameters(&mut self) -> Result<Vec<FormalTypeParameter<'s>>> {
        let mut params = Vec::new();
        if !self.eat(b'<') {
            return Ok(params);
        }
        if self.peek() == Some(b'>') {
            return Err(self.unexpected("type parameter"));
        }

        while !self.eat(b'>') {
            if self.at_end() {
                return Err(self.unexpected("`>`"));
            }
            let reified = self.eat_str("reified ");
            let variance = if self.eat_str("in ") {
                Variance::In
            } else if self.eat_str("out ") {
                Variance::Out
            } else {
                Variance::Invariant
            };
            let name = self.identifier(&[b':', b'>', b'<', b';'])?;
            self.expect(b':', "`:`")?;

            let mut bounds = Vec::new();
            // Empty class bound (`T::Ljava/lang/Runnable;`) is legal.
            if !matches!(self.peek(), Some(b':') | Some(b'>')) {
                bounds.push(self.skim_type()?);
            }
            while self.eat(b':') {
                bounds.push(self.skim_type()?);
            }

            params.push(FormalTypeParameter {
                name,
                variance,
                reified,
                bounds,
            });
        }
        Ok(params)
    }

    /// Validates one type and returns its source slice.
    fn skim_type(&mut self) -> Result<&'s str> {
        let start = self.pos;
        self.skip_type()?;
        Ok(&self.sig[start..self.pos])
    }

    fn skip_type(&mut self) -> Result<()> {
        self.eat(b'?');
        match self.peek() {
            Some(tag) if BaseType::from_tag(tag).is_some() => {
                self.pos += 1;
                Ok(())
            }
            Some(b'[') => {
                self.pos += 1;
                self.skip_type()
            }
            Some(b'T') => {
                self.pos += 1;
                self.identifier(&[b';', b'<', b'>'])?;
                self.expect(b';', "`;`")
            }
            Some(b'L') => {
                self.pos += 1;
                self.identifier(&[b';', b'<', b'.', b'>'])?;
                loop {
                    if self.peek() == Some(b'<') {
                        self.skip_type_arguments()?;
                    }
                    if self.eat(b'.') {
                        self.identifier(&[b';', b'<', b'.', b'>'])?;
                        continue;
                    }
                    return self.expect(b';', "`;`");
                }
            }
            _ => Err(self.unexpected("type")),
        }
    }

    fn skip_type_arguments(&mut self) -> Result<()> {
        self.expect(b'<', "`<`")?;
        if self.peek() == Some(b'>') {
            return Err(self.unexpected("type argument"));
        }
        while !self.eat(b'>') {
            if self.at_end() {
                return Err(self.unexpected("`>`"));
            }
            if self.eat(b'*') {
                continue;
            }
            if matches!(self.peek(), Some(b'+') | Some(b'-') | Some(b'=')) {
                self.pos += 1;
            }
            self.skip_type()?;
        }
        Ok(())
    }

    fn decode<S: TypeSink>(&mut self, sink: &mut S) -> std::result::Result<S::Output, S::Error> {
        let nullable = self.eat(b'?');
        if let Some(base) = self.peek().and_then(BaseType::from_tag) {
            self.pos += 1;
            return sink.base_type(base, nullable);
        }
        match self.peek() {
            Some(b'[') => {
                self.pos += 1;
                let component = self.decode(sink)?;
                sink.array_type(component, nullable)
            }
            Some(b'T') => {
                self.pos += 1;
                let name = self.identifier(&[b';', b'<', b'>'])?;
                self.expect(b';', "`;`")?;
                sink.type_variable(name, nullable)
            }
            Some(b'L') => {
                self.pos += 1;
                self.decode_class(sink, nullable)
            }
            _ => Err(self.unexpected("type").into()),
        }
    }

    fn decode_class<S: TypeSink>(
        &mut self,
        sink: &mut S,
        nullable: bool,
    ) -> std::result::Result<S::Output, S::Error> {
        let mut name = self.identifier(&[b';', b'<', b'.', b'>'])?.to_string();
        let mut arguments = Vec::new();
        loop {
            if self.peek() == Some(b'<') {
                arguments = self.decode_type_arguments(sink)?;
            }
            if self.eat(b'.') {
                // Only the innermost segment keeps its arguments.
                let inner = self.identifier(&[b';', b'<', b'.', b'>'])?;
                name.push('$');
                name.push_str(inner);
                arguments = Vec::new();
                continue;
            }
            self.expect(b';', "`;`")?;
            break;
        }
        sink.class_type(ClassName::classify(name), arguments, nullable)
    }

    fn decode_type_arguments<S: TypeSink>(
        &mut self,
        sink: &mut S,
    ) -> std::result::Result<Vec<TypeArgument<S::Output>>, S::Error> {
        self.expect(b'<', "`<`")?;
        if self.peek() == Some(b'>') {
            return Err(self.unexpected("type argument").into());
        }
        let mut arguments = Vec::new();
        while !self.eat(b'>') {
            if self.at_end() {
                return Err(self.unexpected("`>`").into());
            }
            if self.eat(b'*') {
                arguments.push(TypeArgument::Star);
                continue;
            }
            let variance = match self.peek() {
                Some(b'+') => Variance::Out,
                Some(b'-') => Variance::In,
                Some(b'=') => Variance::Invariant,
                _ => Variance::Invariant,
            };
            if matches!(self.peek(), Some(b'+') | Some(b'-') | Some(b'=')) {
                self.pos += 1;
            }
            let ty = self.decode(sink)?;
            arguments.push(TypeArgument::Projected(variance, ty));
        }
        Ok(arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formal_parameters_keep_raw_bound_slices() {
        let params =
            parse_formal_type_parameters("<T::Ljava/lang/Runnable;:Ljava/io/Closeable;U:TT;>")
                .unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "T");
        assert_eq!(
            params[0].bounds(),
            &["Ljava/lang/Runnable;", "Ljava/io/Closeable;"]
        );
        assert_eq!(params[1].bounds(), &["TT;"]);
    }

    #[test]
    fn native_markers_on_formal_parameters() {
        let params =
            parse_formal_type_parameters("<reified out T:?Ljava/lang/Object;in R:>").unwrap();
        assert!(params[0].reified);
        assert_eq!(params[0].variance, Variance::Out);
        assert_eq!(params[0].bounds(), &["?Ljava/lang/Object;"]);
        assert!(!params[1].reified);
        assert_eq!(params[1].variance, Variance::In);
        assert!(params[1].bounds().is_empty());
    }

    #[test]
    fn rejects_empty_parameter_list() {
        let err = parse_formal_type_parameters("<>").unwrap_err();
        assert_eq!(err.offset(), 1);
    }

    #[test]
    fn validate_reports_offset_of_bad_tag() {
        let err = validate_type("Ljava/util/List<Q>;").unwrap_err();
        assert_eq!(err.offset(), 16);
        assert!(matches!(err, Error::UnexpectedChar { found: 'Q', .. }));
    }
}
