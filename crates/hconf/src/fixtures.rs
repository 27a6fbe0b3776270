#[cfg(test)]
pub mod test {
    use crate::{BoolValue, Int64Value, StringSliceValue, StringValue};

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Foo {
        pub screensize: StringValue,
        pub likes_cats: BoolValue,
        pub likes_dogs: BoolValue,
        pub friends: StringSliceValue,
        pub age: Int64Value,
    }

    crate::schema! {
        Foo {
            values {
                "screensize" => screensize,
                "likes_cats" => likes_cats,
                "likes_dogs" => likes_dogs,
                "friends" => friends,
                "age" => age,
            }
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct MyConf {
        pub version: String,
        pub foo: Foo,
        pub bar: Foo,
        /// not tagged, never touched by decoding
        pub scratch: String,
    }

    crate::schema! {
        MyConf {
            values { "version" => version }
            sections { "foo" => foo, "bar" => bar }
        }
    }

    /// Plain (non-holder) destination kinds
    #[derive(Debug, Default, PartialEq)]
    pub struct Primitives {
        pub enabled: bool,
        pub retries: i64,
        pub ratio: f64,
        pub name: String,
        pub tags: Vec<String>,
        pub limit: Option<i64>,
        pub nickname: Option<StringValue>,
    }

    crate::schema! {
        Primitives {
            values {
                "enabled" => enabled,
                "retries" => retries,
                "ratio" => ratio,
                "name" => name,
                "tags" => tags,
                "limit" => limit,
                "nickname" => nickname,
            }
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct PrimitivesConf {
        pub main: Primitives,
    }

    crate::schema! {
        PrimitivesConf {
            sections { "main" => main }
        }
    }

    pub const CONF: &str = r#"
section "foo" {
    screensize = "hello world"
	likes_cats = true
	likes_dogs = false
	friends = ["alice", "bob"]
}
"#;

    pub const CONF_CATS_ONLY: &str = r#"
section "foo" {
	likes_cats = true
}
"#;
}
