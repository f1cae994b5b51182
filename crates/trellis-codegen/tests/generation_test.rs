//! End-to-end generation over a small JSON model.

use std::collections::HashSet;
use trellis_codegen::{GenerateError, Generator};
use trellis_config::{BlockedVirtual, GeneratorConfig};
use trellis_model::ClassRegistry;

const MODEL: &str = r#"{
  "classes": [
    {
      "name": "QObject",
      "module": "QtCore",
      "functions": [
        {
          "name": "timerEvent",
          "fullname": "QObject::timerEvent",
          "virtual": "impure",
          "output": "void",
          "parameters": [{ "name": "event", "value": "QTimerEvent *" }]
        },
        {
          "name": "childEvent",
          "fullname": "QObject::childEvent",
          "virtual": "impure",
          "output": "void",
          "parameters": [{ "name": "event", "value": "QChildEvent *" }]
        }
      ]
    },
    { "name": "QTimerEvent", "module": "QtCore" },
    { "name": "QChildEvent", "module": "QtCore" },
    {
      "name": "QAbstractButton",
      "module": "QtWidgets",
      "bases": ["QObject"],
      "functions": [
        { "name": "clicked", "fullname": "QAbstractButton::clicked", "meta": "signal" },
        {
          "name": "clicked",
          "fullname": "QAbstractButton::clicked",
          "meta": "signal",
          "overload": 2,
          "parameters": [{ "name": "checked", "value": "bool" }]
        },
        {
          "name": "operator==",
          "fullname": "QAbstractButton::operator==",
          "output": "bool",
          "parameters": [{ "name": "other", "value": "const QAbstractButton &" }]
        }
      ]
    },
    { "name": "FancyButton", "module": "main", "bases": ["Button"] },
    { "name": "Button", "module": "main", "bases": ["Widget"] },
    {
      "name": "Widget",
      "module": "main",
      "bases": ["QObject"],
      "functions": [
        { "name": "paint", "fullname": "Widget::paint", "virtual": "impure", "output": "void" }
      ]
    },
    {
      "name": "Timer",
      "module": "main",
      "bases": ["QObject"],
      "functions": [
        {
          "name": "Timer",
          "fullname": "Timer::Timer",
          "meta": "constructor",
          "parameters": [{ "name": "parent", "value": "QObject *" }]
        }
      ]
    }
  ]
}"#;

fn registry() -> ClassRegistry {
    ClassRegistry::from_json(MODEL).expect("model should parse")
}

fn declarations(header: &str) -> Vec<&str> {
    header
        .lines()
        .filter(|line| !line.starts_with('#') && line.ends_with(");"))
        .collect()
}

#[test]
fn test_generation_is_deterministic() {
    let config = GeneratorConfig::default();
    let first_registry = registry();
    let second_registry = registry();

    for module in first_registry.modules() {
        let first = Generator::new(&first_registry, &config).generate(&module).unwrap();
        let second = Generator::new(&second_registry, &config).generate(&module).unwrap();
        assert_eq!(first.header, second.header, "header of {}", module);
        assert_eq!(first.implementation, second.implementation, "implementation of {}", module);
        assert_eq!(first.skipped, second.skipped);
    }
}

#[test]
fn test_main_classes_follow_their_bases() {
    let registry = registry();
    let config = GeneratorConfig::default();
    let artifacts = Generator::new(&registry, &config).generate("main").unwrap();
    let header = &artifacts.header;

    let widget = header.find("void Widget_Paint(").unwrap();
    let button = header.find("void Button_Paint(").unwrap();
    let fancy = header.find("void FancyButton_Paint(").unwrap();
    assert!(widget < button);
    assert!(button < fancy);
}

#[test]
fn test_no_duplicate_declarations() {
    let registry = registry();
    let config = GeneratorConfig::default();
    let generator = Generator::new(&registry, &config);

    for module in registry.modules() {
        let artifacts = generator.generate(&module).unwrap();
        let mut seen = HashSet::new();
        for declaration in declarations(&artifacts.header) {
            assert!(seen.insert(declaration), "duplicate in {}: {}", module, declaration);
        }
    }
}

#[test]
fn test_main_widget_paint() {
    let registry = registry();
    let config = GeneratorConfig::default();
    let artifacts = Generator::new(&registry, &config).generate("main").unwrap();

    assert_eq!(artifacts.stem, "moc");
    assert!(artifacts.header.contains("void Widget_Paint(void* ptr);\n"));
    assert!(!artifacts.header.contains("Widget_PaintDefault"));
    assert!(artifacts
        .implementation
        .contains("class Widget: public QObject {\nQ_OBJECT\npublic:\n"));
    assert!(artifacts
        .implementation
        .contains("\tvoid paint() { callbackWidgetPaint(this, \"paint\"); }\n"));
    assert!(artifacts
        .implementation
        .contains("void Widget_Paint(void* ptr)\n{\n\tstatic_cast<Widget*>(ptr)->paint();\n}\n"));
}

#[test]
fn test_main_constructor() {
    let registry = registry();
    let config = GeneratorConfig::default();
    let artifacts = Generator::new(&registry, &config).generate("main").unwrap();

    assert!(artifacts.header.contains("void* Timer_NewTimer(void* parent);\n"));
    assert!(artifacts.implementation.contains(
        "void* Timer_NewTimer(void* parent)\n{\n\treturn new Timer(static_cast<QObject*>(parent));\n}\n"
    ));
}

#[test]
fn test_overloaded_signal_connect() {
    let registry = registry();
    let config = GeneratorConfig::default();
    let artifacts = Generator::new(&registry, &config).generate("QtWidgets").unwrap();

    assert!(artifacts.header.contains("void QAbstractButton_ConnectClicked(void* ptr);\n"));
    assert!(artifacts.header.contains("void QAbstractButton_ConnectClicked2(void* ptr);\n"));
    assert!(artifacts.header.contains("void QAbstractButton_Clicked2(void* ptr, int checked);\n"));
    assert!(artifacts.implementation.contains(
        "\tvoid Signal_Clicked2(bool checked) { callbackQAbstractButtonClicked2(this, \"clicked\", checked); }\n"
    ));
    assert!(artifacts
        .implementation
        .contains("static_cast<void (MyQAbstractButton::*)(bool)>(&MyQAbstractButton::Signal_Clicked2)"));
}

#[test]
fn test_operators_are_skipped_with_marker() {
    let registry = registry();
    let config = GeneratorConfig::default();
    let artifacts = Generator::new(&registry, &config).generate("QtWidgets").unwrap();

    assert!(!artifacts.header.contains("perator"));
    assert!(!artifacts.implementation.contains("perator"));
    assert_eq!(
        artifacts.marker_for("QAbstractButton", "operator=="),
        Some("unsupported_identifier")
    );
}

#[test]
fn test_blocked_virtuals() {
    let registry = registry();
    let config = GeneratorConfig::default();
    let artifacts = Generator::new(&registry, &config).generate("QtWidgets").unwrap();
    assert!(artifacts
        .header
        .contains("void QAbstractButton_TimerEvent(void* ptr, void* event);\n"));
    assert!(artifacts
        .implementation
        .contains("callbackQAbstractButtonTimerEvent(this, \"timerEvent\", event)"));

    let mut config = GeneratorConfig::default();
    config
        .filter
        .blocked_virtuals
        .push(BlockedVirtual::new("timerEvent", "QAbstractButton"));
    let artifacts = Generator::new(&registry, &config).generate("QtWidgets").unwrap();
    assert!(!artifacts.header.contains("QAbstractButton_TimerEvent"));
    assert!(!artifacts.implementation.contains("QAbstractButton_TimerEvent"));
    assert!(!artifacts.implementation.contains("callbackQAbstractButtonTimerEvent"));

    // the default list blocks QObject::childEvent on QObject itself
    let core = Generator::new(&registry, &config).generate("QtCore").unwrap();
    assert!(core.header.contains("void QObject_ChildEvent(void* ptr, void* event);\n"));
    assert!(!core.header.contains("QObject_ChildEventDefault"));
    assert!(core.header.contains("void QObject_TimerEventDefault(void* ptr, void* event);\n"));
}

#[test]
fn test_cycle_is_fatal() {
    let registry = ClassRegistry::from_json(
        r#"{ "classes": [
            { "name": "A", "module": "main", "bases": ["B"] },
            { "name": "B", "module": "main", "bases": ["A"] }
        ] }"#,
    )
    .unwrap();
    let config = GeneratorConfig::default();

    let err = Generator::new(&registry, &config).generate("main").unwrap_err();
    assert!(matches!(err, GenerateError::DependencyCycle { ref classes, .. } if classes.len() == 2));
}
