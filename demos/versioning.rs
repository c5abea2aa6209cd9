//! Versioned interfaces that extend and override each other.
//!
//! `V2` extends `V1` without changes, and `V3` extends `V2`, overrides the
//! `describe` capability and adds `migrate`. One concrete type provides all
//! of them, and which implementation runs depends only on the interface the
//! value was erased as.
//!
//! # Running this Demo
//!
//! ```bash
//! cargo run --example versioning --features std
//! ```

use polyface::{prelude::*, registry};

struct DescribeV1;

impl Capability for DescribeV1 {
    const NAME: &'static str = "describe";
    type Receiver = ByRef;
    type Args<'a> = ();
    type Output = String;
}

struct DescribeV3;

impl Capability for DescribeV3 {
    const NAME: &'static str = "describe";
    type Receiver = ByRef;
    type Args<'a> = ();
    type Output = String;
}

struct Migrate;

impl Capability for Migrate {
    const NAME: &'static str = "migrate";
    type Receiver = ByMut;
    type Args<'a> = u32;
    type Output = u32;
}

interface! { struct V1 { DescribeV1 } }
interface! { struct V2: V1 {} }
interface! { struct V3: V2 { DescribeV3, Migrate } }

#[derive(Clone, Debug)]
struct Record {
    schema: u32,
}

impl Implementation<Record> for DescribeV1 {
    fn invoke<'a>(record: &'a Record, (): ()) -> String {
        format!("v1 record (schema {})", record.schema)
    }
}

impl Implementation<Record> for DescribeV3 {
    fn invoke<'a>(record: &'a Record, (): ()) -> String {
        format!("v3 record (schema {}, migratable)", record.schema)
    }
}

impl ImplementationMut<Record> for Migrate {
    fn invoke_mut<'a>(record: &'a mut Record, to: u32) -> u32 {
        let from = record.schema;
        record.schema = to;
        from
    }
}

fn print_layout<I: Interface>() {
    println!("{}:", I::NAME);
    for slot in registry::layout::<I>().slots() {
        println!(
            "  slot {} `{}` declared by {} ({:?})",
            slot.index(),
            slot.name(),
            slot.declared_by(),
            slot.resolution()
        );
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    print_layout::<V1>();
    print_layout::<V2>();
    print_layout::<V3>();
    println!();

    let v2: Poly<V2> = Poly::new(Record { schema: 1 });
    println!("through V2: {}", v2.call::<DescribeV1>(()));

    let mut v3: Poly<V3> = Poly::new(Record { schema: 1 });
    let previous = v3.call_mut::<Migrate>(3);
    println!("migrated from schema {previous}");
    println!("through V3: {}", v3.call::<DescribeV3>(()));

    let v2 = v3.upcast();
    println!("upcast to V2: {}", v2.call::<DescribeV1>(()));
    println!("{v2:?}");
}
