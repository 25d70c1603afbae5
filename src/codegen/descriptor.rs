//! Utilities to build method/field descriptors

use crate::ast::Type;
use crate::common::ClassResolver;

pub fn type_to_descriptor(ty: &Type, resolver: &ClassResolver<'_>) -> String {
    match ty {
        Type::Int => "I".to_string(),
        Type::Boolean => "Z".to_string(),
        Type::Void => "V".to_string(),
        Type::ArrayOfInt | Type::Vararg => "[I".to_string(),
        Type::ArrayOfString => "[Ljava/lang/String;".to_string(),
        Type::Object(name) => format!("L{};", resolver.binary_name(name)),
    }
}

pub fn method_descriptor<'t>(
    params: impl IntoIterator<Item = &'t Type>,
    ret: &Type,
    resolver: &ClassResolver<'_>,
) -> String {
    let mut d = String::new();
    d.push('(');
    for p in params {
        d.push_str(&type_to_descriptor(p, resolver));
    }
    d.push(')');
    d.push_str(&type_to_descriptor(ret, resolver));
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_and_array_descriptors() {
        let imports = vec!["java.util.List".to_string()];
        let resolver = ClassResolver::from_parts("Foo", &imports);
        assert_eq!(type_to_descriptor(&Type::Int, &resolver), "I");
        assert_eq!(type_to_descriptor(&Type::Boolean, &resolver), "Z");
        assert_eq!(type_to_descriptor(&Type::Void, &resolver), "V");
        assert_eq!(type_to_descriptor(&Type::ArrayOfInt, &resolver), "[I");
        assert_eq!(type_to_descriptor(&Type::Vararg, &resolver), "[I");
        assert_eq!(
            type_to_descriptor(&Type::ArrayOfString, &resolver),
            "[Ljava/lang/String;"
        );
    }

    #[test]
    fn test_object_descriptors_resolve_imports() {
        let imports = vec!["java.util.List".to_string()];
        let resolver = ClassResolver::from_parts("Foo", &imports);
        assert_eq!(
            type_to_descriptor(&Type::object("List"), &resolver),
            "Ljava/util/List;"
        );
        assert_eq!(type_to_descriptor(&Type::object("Foo"), &resolver), "LFoo;");
        assert_eq!(
            type_to_descriptor(&Type::string(), &resolver),
            "Ljava/lang/String;"
        );
        assert_eq!(type_to_descriptor(&Type::object("Bar"), &resolver), "LBar;");
    }

    #[test]
    fn test_method_descriptor() {
        let resolver = ClassResolver::from_parts("Foo", &[]);
        let params = [Type::Int, Type::ArrayOfInt, Type::Boolean];
        assert_eq!(
            method_descriptor(params.iter(), &Type::Int, &resolver),
            "(I[IZ)I"
        );
        assert_eq!(method_descriptor([].iter(), &Type::Void, &resolver), "()V");
    }
}
