use crate::error::{Error, Result};
use crate::name::FqName;
use crate::types::{ForeignType, PrimitiveKind};

/// Erased method shape read from a JVM method descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<ForeignType>,
    pub return_type: ForeignType,
}

pub fn parse_field_descriptor(desc: &str) -> Result<ForeignType> {
    let (ty, rest) = parse_field_type(desc)?;
    if !rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let Some(mut rest) = desc.strip_prefix('(') else {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    };

    let mut params = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            rest = after;
            break;
        }
        if rest.is_empty() {
            return Err(Error::InvalidDescriptor(desc.to_string()));
        }
        let (param, after) = parse_field_type(rest)?;
        params.push(param);
        rest = after;
    }

    let (return_type, rest) = if let Some(after) = rest.strip_prefix('V') {
        (ForeignType::Primitive(PrimitiveKind::Void), after)
    } else {
        parse_field_type(rest)?
    };

    if !rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }

    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

/// `Ljava/lang/Deprecated;` -> `java.lang.Deprecated`
pub fn descriptor_to_fq_name(desc: &str) -> Option<FqName> {
    desc.strip_prefix('L')
        .and_then(|rest| rest.strip_suffix(';'))
        .map(FqName::from_internal)
}

fn parse_field_type(input: &str) -> Result<(ForeignType, &str)> {
    let Some(first) = input.chars().next() else {
        return Err(Error::InvalidDescriptor(input.to_string()));
    };
    let primitive = match first {
        'B' => Some(PrimitiveKind::Byte),
        'C' => Some(PrimitiveKind::Char),
        'D' => Some(PrimitiveKind::Double),
        'F' => Some(PrimitiveKind::Float),
        'I' => Some(PrimitiveKind::Int),
        'J' => Some(PrimitiveKind::Long),
        'S' => Some(PrimitiveKind::Short),
        'Z' => Some(PrimitiveKind::Boolean),
        _ => None,
    };
    if let Some(kind) = primitive {
        return Ok((ForeignType::Primitive(kind), &input[1..]));
    }

    match first {
        'L' => match input.find(';') {
            Some(end) if end > 1 => Ok((
                ForeignType::class(FqName::from_internal(&input[1..end])),
                &input[end + 1..],
            )),
            _ => Err(Error::InvalidDescriptor(input.to_string())),
        },
        '[' => {
            let (component, rest) = parse_field_type(&input[1..])?;
            Ok((ForeignType::array(component), rest))
        }
        _ => Err(Error::InvalidDescriptor(input.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field_descriptor_primitives_and_arrays() {
        assert_eq!(
            parse_field_descriptor("I").unwrap(),
            ForeignType::Primitive(PrimitiveKind::Int)
        );
        assert_eq!(
            parse_field_descriptor("[[Ljava/lang/String;").unwrap(),
            ForeignType::array(ForeignType::array(ForeignType::class("java.lang.String")))
        );
        assert!(parse_field_descriptor("L;").is_err());
    }

    #[test]
    fn parse_method_descriptor_basic() {
        let desc = parse_method_descriptor("(ILjava/util/Map$Entry;)[I").unwrap();
        assert_eq!(
            desc.params,
            vec![
                ForeignType::Primitive(PrimitiveKind::Int),
                ForeignType::class("java.util.Map.Entry"),
            ]
        );
        assert_eq!(
            desc.return_type,
            ForeignType::array(ForeignType::Primitive(PrimitiveKind::Int))
        );
        assert!(parse_method_descriptor("(I").is_err());
        assert!(parse_method_descriptor("()VV").is_err());
    }
}
