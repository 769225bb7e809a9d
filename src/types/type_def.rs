//! Type definitions
//!
//! This module defines the type system for Asl: the closed set of types, the
//! kind predicates, and the compatibility rules used by the checker.

use std::fmt;

use crate::ast::{BasicType, RelationalOp, TypeSpec};

/// Semantic type of an expression or declaration
///
/// `Error` marks an inconsistency that has already been reported. The checker
/// tests for it before every rule so a single mistake is diagnosed once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Error,
    Void,
    Integer,
    Float,
    Boolean,
    Character,
    Array {
        element: Box<Type>,
        size: u32,
    },
    Function {
        params: Vec<Type>,
        return_type: Box<Type>,
    },
}

impl Type {
    pub fn array(element: Type, size: u32) -> Self {
        Type::Array {
            element: Box::new(element),
            size,
        }
    }

    pub fn function(params: Vec<Type>, return_type: Type) -> Self {
        Type::Function {
            params,
            return_type: Box::new(return_type),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Integer)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Float)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Type::Boolean)
    }

    pub fn is_character(&self) -> bool {
        matches!(self, Type::Character)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array { .. })
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function { .. })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Integer | Type::Float)
    }

    /// Scalar kinds, `Void` included
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Type::Void | Type::Integer | Type::Float | Type::Boolean | Type::Character
        )
    }

    pub fn is_primitive_non_void(&self) -> bool {
        self.is_primitive() && !self.is_void()
    }

    /// A function whose return type is `Void`
    pub fn is_void_function(&self) -> bool {
        matches!(self, Type::Function { return_type, .. } if return_type.is_void())
    }

    pub fn array_element_type(&self) -> Option<&Type> {
        match self {
            Type::Array { element, .. } => Some(element),
            _ => None,
        }
    }

    pub fn array_size(&self) -> Option<u32> {
        match self {
            Type::Array { size, .. } => Some(*size),
            _ => None,
        }
    }

    pub fn function_return_type(&self) -> Option<&Type> {
        match self {
            Type::Function { return_type, .. } => Some(return_type),
            _ => None,
        }
    }

    pub fn function_param_types(&self) -> Option<&[Type]> {
        match self {
            Type::Function { params, .. } => Some(params),
            _ => None,
        }
    }

    pub fn function_param_count(&self) -> Option<usize> {
        self.function_param_types().map(<[Type]>::len)
    }
}

/// Exact structural equality, no coercion
pub fn equal_types(a: &Type, b: &Type) -> bool {
    a == b
}

/// Whether a value of type `src` may be stored where `dst` is declared.
///
/// Integer-into-Float is the only implicit widening.
pub fn is_copyable(dst: &Type, src: &Type) -> bool {
    equal_types(dst, src) || (dst.is_float() && src.is_integer())
}

/// Whether `a op b` is a valid comparison
pub fn is_comparable(a: &Type, b: &Type, op: RelationalOp) -> bool {
    if a.is_numeric() && b.is_numeric() {
        return true;
    }
    op.is_equality() && a.is_primitive_non_void() && equal_types(a, b)
}

impl From<BasicType> for Type {
    fn from(basic: BasicType) -> Self {
        match basic {
            BasicType::Int => Type::Integer,
            BasicType::Float => Type::Float,
            BasicType::Bool => Type::Boolean,
            BasicType::Char => Type::Character,
        }
    }
}

impl From<&TypeSpec> for Type {
    fn from(spec: &TypeSpec) -> Self {
        match *spec {
            TypeSpec::Basic(basic) => basic.into(),
            TypeSpec::Array { size, element } => Type::array(element.into(), size),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Error => write!(f, "error"),
            Type::Void => write!(f, "void"),
            Type::Integer => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Boolean => write!(f, "bool"),
            Type::Character => write!(f, "char"),
            Type::Array { element, size } => write!(f, "array<{size},{element}>"),
            Type::Function { params, return_type } => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")->{return_type}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalars() -> Vec<Type> {
        vec![
            Type::Error,
            Type::Void,
            Type::Integer,
            Type::Float,
            Type::Boolean,
            Type::Character,
        ]
    }

    #[test]
    fn test_copyable_widens_integer_into_float_only() {
        assert!(is_copyable(&Type::Float, &Type::Integer));
        assert!(!is_copyable(&Type::Integer, &Type::Float));
        assert!(is_copyable(&Type::Integer, &Type::Integer));
        assert!(!is_copyable(&Type::Boolean, &Type::Integer));
        assert!(!is_copyable(&Type::Character, &Type::Integer));
    }

    #[test]
    fn test_equal_types_rejects_cross_kind_pairs() {
        for a in scalars() {
            for b in scalars() {
                assert_eq!(equal_types(&a, &b), a == b, "{a} vs {b}");
            }
        }
        assert!(!equal_types(&Type::Float, &Type::Integer));
    }

    #[test]
    fn test_arrays_compare_element_and_size() {
        let a = Type::array(Type::Integer, 10);
        assert!(equal_types(&a, &Type::array(Type::Integer, 10)));
        assert!(!equal_types(&a, &Type::array(Type::Integer, 11)));
        assert!(!equal_types(&a, &Type::array(Type::Float, 10)));
        // no widening through arrays
        assert!(!is_copyable(&Type::array(Type::Float, 10), &a));
    }

    #[test]
    fn test_functions_compare_params_and_return() {
        let f = Type::function(vec![Type::Integer, Type::Boolean], Type::Void);
        assert!(equal_types(
            &f,
            &Type::function(vec![Type::Integer, Type::Boolean], Type::Void)
        ));
        assert!(!equal_types(&f, &Type::function(vec![Type::Integer], Type::Void)));
        assert!(!equal_types(
            &f,
            &Type::function(vec![Type::Integer, Type::Boolean], Type::Integer)
        ));
    }

    #[test]
    fn test_kind_predicates() {
        assert!(Type::Integer.is_numeric());
        assert!(Type::Float.is_numeric());
        assert!(!Type::Character.is_numeric());

        assert!(Type::Void.is_primitive());
        assert!(!Type::Void.is_primitive_non_void());
        assert!(Type::Character.is_primitive_non_void());
        assert!(!Type::Error.is_primitive());
        assert!(!Type::array(Type::Integer, 3).is_primitive());

        assert!(Type::function(vec![], Type::Void).is_void_function());
        assert!(!Type::function(vec![], Type::Integer).is_void_function());
        assert!(!Type::Void.is_void_function());
    }

    #[test]
    fn test_decomposition() {
        let arr = Type::array(Type::Character, 4);
        assert_eq!(arr.array_element_type(), Some(&Type::Character));
        assert_eq!(arr.array_size(), Some(4));
        assert_eq!(Type::Integer.array_element_type(), None);

        let f = Type::function(vec![Type::Float, Type::Integer], Type::Boolean);
        assert_eq!(f.function_return_type(), Some(&Type::Boolean));
        assert_eq!(
            f.function_param_types(),
            Some(&[Type::Float, Type::Integer][..])
        );
        assert_eq!(f.function_param_count(), Some(2));
        assert_eq!(arr.function_param_count(), None);
    }

    #[test]
    fn test_comparisons() {
        use RelationalOp::*;

        assert!(is_comparable(&Type::Integer, &Type::Float, Less));
        assert!(is_comparable(&Type::Float, &Type::Float, GreaterEqual));
        assert!(!is_comparable(&Type::Boolean, &Type::Boolean, Less));
        assert!(!is_comparable(&Type::Character, &Type::Character, Greater));

        assert!(is_comparable(&Type::Boolean, &Type::Boolean, Equal));
        assert!(is_comparable(&Type::Character, &Type::Character, NotEqual));
        assert!(is_comparable(&Type::Integer, &Type::Float, Equal));
        assert!(!is_comparable(&Type::Boolean, &Type::Integer, Equal));
        assert!(!is_comparable(&Type::Void, &Type::Void, Equal));

        let arr = Type::array(Type::Integer, 2);
        assert!(!is_comparable(&arr, &arr, Equal));
    }

    #[test]
    fn test_from_type_spec() {
        assert_eq!(Type::from(&TypeSpec::Basic(BasicType::Bool)), Type::Boolean);
        assert_eq!(
            Type::from(&TypeSpec::Array {
                size: 8,
                element: BasicType::Float
            }),
            Type::array(Type::Float, 8)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::array(Type::Integer, 10).to_string(), "array<10,int>");
        assert_eq!(
            Type::function(vec![Type::Integer, Type::Character], Type::Void).to_string(),
            "(int,char)->void"
        );
        assert_eq!(Type::Error.to_string(), "error");
    }
}
