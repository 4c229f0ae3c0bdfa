//! Generated code against the runtime: the checked-in `tars2rs` output for
//! `common::GEO_IDL`, compiled into this test and driven over every payload
//! version.

mod common;

#[rustfmt::skip]
#[path = "generated/geo.rs"]
mod geo;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use serde_json::json;
use tars_idl::ProtocolVersion;
use tars_idl::codegen::TarsCodec;
use tars_idl::rpc::{
    CallContext, ClientCore, LocalInvoker, RpcError, ServantContext, ServantError,
    ServantRegistry, TarsStruct,
};
use tars_idl::types::{NamedCategory, VarType};
use tars_idl::value::Value;

use geo::{Calc, CalcDispatcher, CalcProxy, CalcWithContext, MAX_FACTOR, Mode, Point, Shape};

const SERVANT: &str = "Geo.CalcServer.CalcObj";

const VERSIONS: [ProtocolVersion; 3] =
    [ProtocolVersion::Tars, ProtocolVersion::Tup, ProtocolVersion::Json];

#[derive(Default)]
struct Counter {
    calls: Arc<AtomicI32>,
}

impl Calc for Counter {
    fn scale(&self, p: Point, factor: i32, scaled: &mut Point) -> Result<i32, ServantError> {
        if factor == 0 || factor > MAX_FACTOR {
            return Err(ServantError::new(-10, "bad factor"));
        }
        *scaled = Point {
            x: p.x * factor,
            y: p.y * factor,
        };
        Ok(self.calls.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn describe(&self, mut shape: Shape, summary: &mut String) -> Result<Shape, ServantError> {
        *summary = format!(
            "{} with {} points, {} labels",
            shape.name,
            shape.points.len(),
            shape.labels.len()
        );
        shape.name = shape.name.to_uppercase();
        shape.mode = Mode::FAST;
        Ok(shape)
    }

    fn reset(&self) -> Result<(), ServantError> {
        self.calls.store(0, Ordering::SeqCst);
        Ok(())
    }
}

fn proxy(registry: &ServantRegistry, version: ProtocolVersion) -> CalcProxy<LocalInvoker> {
    CalcProxy::new(ClientCore::new(LocalInvoker::new(registry.clone()), SERVANT).with_version(version))
}

fn counter_registry() -> (ServantRegistry, Arc<AtomicI32>) {
    let counter = Counter::default();
    let calls = Arc::clone(&counter.calls);
    let registry = ServantRegistry::new();
    registry.register(SERVANT, Arc::new(CalcDispatcher::new(counter)));
    (registry, calls)
}

fn sample_shape() -> Shape {
    Shape {
        name: "tri".to_string(),
        points: vec![Point { x: 1, y: 2 }, Point::default()],
        labels: BTreeMap::from([
            (Point { x: 1, y: 2 }, "origin".to_string()),
            (Point { x: -3, y: 0 }, "left".to_string()),
        ]),
        notes: BTreeMap::from([(Mode::FAST, "quick".to_string()), (Mode(9), "unknown".to_string())]),
        mode: Mode::SAFE,
        weights: vec![BTreeMap::from([(Point { x: 4, y: 4 }, 16)]), BTreeMap::new()],
    }
}

#[test]
fn test_generated_calls_round_trip() {
    let (registry, calls) = counter_registry();

    for version in VERSIONS {
        let calc = proxy(&registry, version);
        let mut scaled = Point::default();
        let n = calc.scale(&Point { x: 2, y: 3 }, &10, &mut scaled).unwrap();
        assert_eq!(scaled, Point { x: 20, y: 30 }, "{version}");
        assert_eq!(n, 1, "{version}");

        let mut summary = String::new();
        let described = calc.describe(&sample_shape(), &mut summary).unwrap();
        assert_eq!(summary, "tri with 2 points, 2 labels", "{version}");
        assert_eq!(
            described,
            Shape {
                name: "TRI".to_string(),
                mode: Mode::FAST,
                ..sample_shape()
            },
            "{version}"
        );

        calc.reset_one_way().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0, "{version}");
        calc.reset().unwrap();
    }
}

#[test]
fn test_servant_errors_leave_outputs_alone() {
    let (registry, _) = counter_registry();

    for version in VERSIONS {
        let mut scaled = Point { x: 1, y: 1 };
        let err = proxy(&registry, version)
            .scale(&Point::default(), &0, &mut scaled)
            .unwrap_err();
        assert_eq!(
            err,
            RpcError::Server {
                code: -10,
                message: "bad factor".into()
            },
            "{version}"
        );
        assert_eq!(scaled, Point { x: 1, y: 1 }, "{version}");
    }
}

#[test]
fn test_struct_defaults_and_wire_form() {
    let bytes = Point { x: 4, y: 5 }.to_bytes().unwrap();
    assert_eq!(bytes, vec![0x00, 0x04, 0x10, 0x05]);
    assert_eq!(Point::from_bytes(&[0x00, 0x04]).unwrap(), Point { x: 4, y: 5 });
    assert!(Point::from_bytes(&[0x10, 0x05]).is_err());

    let shape = Shape::default();
    assert_eq!(shape.name, "unit");
    assert_eq!(shape.mode, Mode::SAFE);
    assert_eq!(Shape::from_bytes(&sample_shape().to_bytes().unwrap()).unwrap(), sample_shape());
    assert_eq!(Mode(9).name(), None);
    assert_eq!(Mode::SAFE.name(), Some("SAFE"));
}

#[test]
fn test_json_matches_schema_driven_mapping() {
    let shape = sample_shape();
    let compilation = common::geo();
    let codec = TarsCodec::new(&compilation.schema);
    let dynamic = codec
        .struct_codec("Geo::Shape")
        .unwrap()
        .from_bytes(&shape.to_bytes().unwrap())
        .unwrap();
    let ty = VarType::named("Geo::Shape", NamedCategory::Struct);
    let expected = codec.to_json(&ty, &Value::Struct(dynamic)).unwrap();

    let json = serde_json::to_value(&shape).unwrap();
    assert_eq!(json, expected);
    // struct keys become pairs, enum keys stay object keys
    assert_eq!(
        json["labels"],
        json!([[{ "x": -3, "y": 0 }, "left"], [{ "x": 1, "y": 2 }, "origin"]])
    );
    assert_eq!(json["notes"], json!({ "1": "quick", "9": "unknown" }));
    assert_eq!(json["weights"], json!([[[{ "x": 4, "y": 4 }, 16]], []]));
    assert_eq!(json["mode"], json!(2));

    let text = serde_json::to_string(&shape).unwrap();
    assert_eq!(serde_json::from_str::<Shape>(&text).unwrap(), shape);
    let decoded = codec.from_json(&ty, Some(&json)).unwrap();
    assert_eq!(
        codec.struct_codec("Geo::Shape").unwrap().to_bytes(decoded.as_struct().unwrap()).unwrap(),
        shape.to_bytes().unwrap()
    );
}

#[test]
fn test_json_nulls_read_as_defaults() {
    let input = json!({
        "name": null,
        "points": [null, { "x": 3, "y": null }],
        "labels": [[null, "zero"]],
        "notes": { "1": null },
        "mode": null,
        "weights": null,
    });
    let shape: Shape = serde_json::from_value(input.clone()).unwrap();
    // null takes the type's default; a missing key keeps the member's
    assert_eq!(
        shape,
        Shape {
            name: String::new(),
            points: vec![Point::default(), Point { x: 3, y: 0 }],
            labels: BTreeMap::from([(Point::default(), "zero".to_string())]),
            notes: BTreeMap::from([(Mode::FAST, String::new())]),
            mode: Mode::default(),
            weights: Vec::new(),
        }
    );

    let point: Point = serde_json::from_value(json!({ "x": 9 })).unwrap();
    assert_eq!(point, Point { x: 9, y: 5 });

    let compilation = common::geo();
    let codec = TarsCodec::new(&compilation.schema);
    let ty = VarType::named("Geo::Shape", NamedCategory::Struct);
    let dynamic = codec.from_json(&ty, Some(&input)).unwrap();
    assert_eq!(
        codec.struct_codec("Geo::Shape").unwrap().to_bytes(dynamic.as_struct().unwrap()).unwrap(),
        shape.to_bytes().unwrap()
    );
}

#[test]
fn test_json_rejects_wrong_shapes() {
    assert!(serde_json::from_value::<Shape>(json!({ "labels": { "a": "b" } })).is_err());
    assert!(serde_json::from_value::<Shape>(json!({ "notes": { "fast": "b" } })).is_err());
    assert!(serde_json::from_value::<Point>(json!({ "x": "1" })).is_err());
}

/// Echoes what it was sent back through the response context.
struct Tagged;

impl CalcWithContext for Tagged {
    fn scale(
        &self,
        tars_ctx: &mut ServantContext,
        p: Point,
        factor: i32,
        scaled: &mut Point,
    ) -> Result<i32, ServantError> {
        let tenant = tars_ctx.context.get("tenant").cloned().unwrap_or_default();
        let priority = tars_ctx.status.get("priority").cloned().unwrap_or_default();
        tars_ctx.set_response_context("served", format!("{tenant}/{}/{priority}", tars_ctx.function));
        if factor == 0 {
            return Err(ServantError::new(-10, "bad factor"));
        }
        *scaled = Point {
            x: p.x * factor,
            y: p.y,
        };
        Ok(i32::try_from(tars_ctx.context.len()).unwrap())
    }

    fn describe(
        &self,
        _tars_ctx: &mut ServantContext,
        shape: Shape,
        _summary: &mut String,
    ) -> Result<Shape, ServantError> {
        Ok(shape)
    }

    fn reset(&self, tars_ctx: &mut ServantContext) -> Result<(), ServantError> {
        tars_ctx.response_context.clear();
        Ok(())
    }
}

#[test]
fn test_call_context_reaches_servant_and_returns() {
    let registry = ServantRegistry::new();
    registry.register(SERVANT, Arc::new(CalcDispatcher::new(Tagged)));

    for version in VERSIONS {
        let calc = CalcProxy::new(
            ClientCore::new(LocalInvoker::new(registry.clone()), SERVANT)
                .with_version(version)
                .with_context("trace", "t-1"),
        );
        let mut ctx = CallContext::new()
            .with_context("tenant", "acme")
            .with_status("priority", "high");
        let mut scaled = Point::default();
        let n = calc
            .scale_with_context(&Point { x: 2, y: 7 }, &3, &mut scaled, &mut ctx)
            .unwrap();
        assert_eq!(scaled, Point { x: 6, y: 7 }, "{version}");
        // proxy-wide and per-call keys both arrived
        assert_eq!(n, 2, "{version}");
        assert_eq!(
            ctx.context,
            BTreeMap::from([
                ("served".to_string(), "acme/scale/high".to_string()),
                ("tenant".to_string(), "acme".to_string()),
                ("trace".to_string(), "t-1".to_string()),
            ]),
            "{version}"
        );
        assert!(ctx.status.is_empty(), "{version}");

        // failures still hand back the response context
        let mut ctx = CallContext::new().with_context("tenant", "zed");
        calc.scale_with_context(&Point::default(), &0, &mut scaled, &mut ctx)
            .unwrap_err();
        assert_eq!(ctx.context.get("served").map(String::as_str), Some("zed/scale/"));

        let mut ctx = CallContext::new().with_context("tenant", "acme");
        calc.reset_with_context(&mut ctx).unwrap();
        assert!(ctx.context.is_empty(), "{version}");
    }
}

#[test]
fn test_plain_servants_see_default_context() {
    let (registry, _) = counter_registry();
    let calc = CalcProxy::new(
        ClientCore::new(LocalInvoker::new(registry), SERVANT).with_context("trace", "t-2"),
    );
    let mut ctx = CallContext::new();
    let mut scaled = Point::default();
    calc.scale_with_context(&Point { x: 1, y: 1 }, &2, &mut scaled, &mut ctx)
        .unwrap();
    assert_eq!(scaled, Point { x: 2, y: 2 });
    // the response context starts as a copy of the request context
    assert_eq!(ctx.context.get("trace").map(String::as_str), Some("t-2"));
    calc.scale_one_way_with_context(&Point::default(), &1, &CallContext::new().with_context("k", "v"))
        .unwrap();
}
