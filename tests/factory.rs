//! Command-factory expansion exercised end-to-end through `Pipeline::execute`.

use pipewright::reflect::FilterDescriptor;
use pipewright::{engine, Pipeline, PipelineCommand};
use std::sync::Arc;

#[test]
fn factory_expands_before_execution_begins() {
    engine().registry.register_method(
        "FactoryE2EText",
        FilterDescriptor::new("Upper"),
        Arc::new(|input: &str, _cmd, _log| Ok(input.to_uppercase())),
    );
    engine().registry.register_method(
        "FactoryE2EText",
        FilterDescriptor::new("Exclaim"),
        Arc::new(|input: &str, _cmd, _log| Ok(format!("{input}!"))),
    );
    engine().registry.register_factory(
        "FactoryE2EMacro.Shout",
        Arc::new(|_matched| {
            vec![PipelineCommand::new("FactoryE2EText.Upper"), PipelineCommand::new("FactoryE2EText.Exclaim")]
        }),
    );

    let mut pipeline = Pipeline::new();
    pipeline.add_command(PipelineCommand::new("FactoryE2EMacro.Shout"));
    let output = pipeline.execute(Some("hi".to_string())).unwrap();
    assert_eq!(output, "HI!");
}

#[test]
fn factory_pattern_matching_is_case_insensitive_end_to_end() {
    engine().registry.register_method(
        "FactoryCaseText",
        FilterDescriptor::new("Reverse"),
        Arc::new(|input: &str, _cmd, _log| Ok(input.chars().rev().collect())),
    );
    engine()
        .registry
        .register_factory("factorycasemacro.flip", Arc::new(|_| vec![PipelineCommand::new("FactoryCaseText.Reverse")]));

    let mut pipeline = Pipeline::new();
    pipeline.add_command(PipelineCommand::new("FACTORYCASEMACRO.FLIP"));
    let output = pipeline.execute(Some("abc".to_string())).unwrap();
    assert_eq!(output, "cba");
}

#[test]
fn wildcard_factory_matches_many_names() {
    engine().registry.register_method(
        "FactoryWildcardText",
        FilterDescriptor::new("Tag"),
        Arc::new(|input: &str, _cmd, _log| Ok(format!("[{input}]"))),
    );
    engine().registry.register_factory(
        "FactoryWildcardMacro.*",
        Arc::new(|_| vec![PipelineCommand::new("FactoryWildcardText.Tag")]),
    );

    let mut one = Pipeline::new();
    one.add_command(PipelineCommand::new("FactoryWildcardMacro.First"));
    assert_eq!(one.execute(Some("a".to_string())).unwrap(), "[a]");

    let mut two = Pipeline::new();
    two.add_command(PipelineCommand::new("FactoryWildcardMacro.Second"));
    assert_eq!(two.execute(Some("b".to_string())).unwrap(), "[b]");
}
