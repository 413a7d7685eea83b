//! Process-global hook scenarios, including cancellation.

use pipewright::reflect::FilterDescriptor;
use pipewright::{engine, Pipeline, PipelineCommand};
use std::sync::Arc;

#[test]
fn command_loading_hook_cancels_matching_registration() {
    engine().registry.command_loading.subscribe(|event| {
        if event.qualified_name == "hookscanceltext.append" {
            event.cancel = true;
        }
    });

    engine().registry.register_method(
        "HooksCancelText",
        FilterDescriptor::new("Append"),
        Arc::new(|input: &str, _cmd, _log| Ok(format!("{input}BAR"))),
    );

    assert!(!engine().registry.contains("hookscanceltext.append"));

    let mut pipeline = Pipeline::new();
    pipeline.add_command(PipelineCommand::new("HooksCancelText.Append"));
    let err = pipeline.execute(Some("FOO".to_string())).unwrap_err();
    assert!(matches!(err, pipewright::PipelineError::CommandMissing { .. }));
}

#[test]
fn category_doc_loading_hook_can_suppress_a_category_record() {
    engine().registry.category_doc_loading.subscribe(|event| {
        if event.category == "hookssuppresscategory" {
            event.cancel = true;
        }
    });
    engine().registry.register_method(
        "HooksSuppressCategory",
        FilterDescriptor::new("Method"),
        Arc::new(|input: &str, _cmd, _log| Ok(input.to_string())),
    );
    assert!(engine().registry.contains("hookssuppresscategory.method"));
    assert!(!engine().registry.categories().contains("hookssuppresscategory"));
}

#[test]
fn filter_doc_loading_hook_can_suppress_a_filter_doc_entry() {
    engine().registry.filter_doc_loading.subscribe(|event| {
        if event.qualified_name == "hookssuppressdoc.method" {
            event.cancel = true;
        }
    });
    engine().registry.register_method(
        "HooksSuppressDoc",
        FilterDescriptor::new("Method").with_description("should not appear"),
        Arc::new(|input: &str, _cmd, _log| Ok(input.to_string())),
    );
    assert!(engine().registry.contains("hookssuppressdoc.method"));
    assert!(!engine().registry.filter_docs().contains_key("hookssuppressdoc.method"));
}

#[test]
fn per_pipeline_hooks_do_not_leak_across_pipeline_instances() {
    engine().registry.register_method(
        "HooksLeakText",
        FilterDescriptor::new("Echo"),
        Arc::new(|input: &str, _cmd, _log| Ok(input.to_string())),
    );

    let mut first = Pipeline::new();
    first.on_filter_executing(|event| event.input = "overridden".to_string());
    first.add_command(PipelineCommand::new("HooksLeakText.Echo"));
    assert_eq!(first.execute(Some("original".to_string())).unwrap(), "overridden");

    let mut second = Pipeline::new();
    second.add_command(PipelineCommand::new("HooksLeakText.Echo"));
    assert_eq!(second.execute(Some("original".to_string())).unwrap(), "original");
}
