use crate::commands::{list, matching, progress};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "list",
            groups: list::EXAMPLES,
        },
        CommandExample {
            name: "match",
            groups: matching::EXAMPLES,
        },
        CommandExample {
            name: "progress",
            groups: progress::EXAMPLES,
        },
    ]
}
