//! Common test fixtures.

#![allow(dead_code)]

use tars_idl::model::{Compilation, compile_str};

/// Module exercised by most integration tests.
pub const DEMO_IDL: &str = r#"
module Demo
{
    enum Level { LOW = 0, MID, HIGH = MID };

    const int MAX_AGE = 150;
    const string GREETING = "hello";

    struct User
    {
        0 require string name;
        1 optional int age = 18;
    };

    struct Team
    {
        0 require string title;
        1 optional vector<User> members;
        2 optional map<string, int> scores;
        3 optional vector<byte> logo;
        4 optional Level level;
        5 optional double rating;
    };

    interface Greeter
    {
        string greet(User user, out int calls);
        int add(int a, int b, out string text);
        void notify(string message);
    };
};
"#;

pub const SERVANT: &str = "Demo.GreeterServer.GreeterObj";

pub fn demo() -> Compilation {
    compile_str("demo.tars", DEMO_IDL).unwrap()
}

/// Module whose generated source is checked in as `tests/generated/geo.rs`.
pub const GEO_IDL: &str = r#"
module Geo
{
    enum Mode { FAST = 1, SAFE };

    const int MAX_FACTOR = 100;

    struct Point
    {
        0 require int x;
        1 optional int y = 5;
    };

    struct Shape
    {
        0 optional string name = "unit";
        1 optional vector<Point> points;
        2 optional map<Point, string> labels;
        3 optional map<Mode, string> notes;
        4 optional Mode mode = SAFE;
        5 optional vector<map<Point, int>> weights;
    };

    interface Calc
    {
        int scale(Point p, int factor, out Point scaled);
        Shape describe(Shape shape, out string summary);
        void reset();
    };
};
"#;

pub fn geo() -> Compilation {
    compile_str("geo.tars", GEO_IDL).unwrap()
}
