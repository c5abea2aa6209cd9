//! Drawing unrelated shapes through one interface.
//!
//! This demo erases three shape types that share nothing but a `draw`
//! capability, keeps them in one `Vec`, and shows how the storage strategy
//! changes what copying an erased value means.
//!
//! # Running this Demo
//!
//! ```bash
//! cargo run --example drawing --features std
//! ```
//!
//! The `debug` and `trace` events of the registry are printed to the console.

use std::cell::Cell;

use polyface::prelude::*;

/// Appends a description of the shape.
struct Draw;

impl Capability for Draw {
    const NAME: &'static str = "draw";
    type Receiver = ByRef;
    type Args<'a> = &'a mut String;
    type Output = ();
}

/// Scales the shape in place.
struct Scale;

impl Capability for Scale {
    const NAME: &'static str = "scale";
    type Receiver = ByMut;
    type Args<'a> = f64;
    type Output = ();
}

interface! {
    /// Anything that can be drawn.
    struct Drawable { Draw }
}

interface! {
    /// Anything that can be drawn and scaled.
    struct Scalable: Drawable { Scale }
}

#[derive(Clone, Debug)]
struct Square {
    side: f64,
}

#[derive(Clone, Debug)]
struct Circle {
    radius: f64,
}

/// Cannot be copied: it counts how often it was drawn.
#[derive(Debug, Default)]
struct Tally {
    draws: Cell<u32>,
}

impl Implementation<Square> for Draw {
    fn invoke<'a>(square: &'a Square, out: &'a mut String) {
        out.push_str(&format!("Square({}) ", square.side));
    }
}

impl Implementation<Circle> for Draw {
    fn invoke<'a>(circle: &'a Circle, out: &'a mut String) {
        out.push_str(&format!("Circle({}) ", circle.radius));
    }
}

impl Implementation<Tally> for Draw {
    fn invoke<'a>(tally: &'a Tally, out: &'a mut String) {
        tally.draws.set(tally.draws.get() + 1);
        out.push_str(&format!("Tally#{} ", tally.draws.get()));
    }
}

impl ImplementationMut<Square> for Scale {
    fn invoke_mut<'a>(square: &'a mut Square, factor: f64) {
        square.side *= factor;
    }
}

impl ImplementationMut<Circle> for Scale {
    fn invoke_mut<'a>(circle: &'a mut Circle, factor: f64) {
        circle.radius *= factor;
    }
}

fn render<S: polyface::Storage>(shapes: &[Poly<Drawable, S>]) -> String {
    let mut out = String::new();
    for shape in shapes {
        shape.call::<Draw>(&mut out);
    }
    out
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    println!("Example 1: A container of unrelated shapes\n");
    let shapes: Vec<Poly<Drawable>> = vec![
        Poly::new(Square { side: 1.0 }),
        Poly::new(Circle { radius: 2.0 }),
        Poly::new_move_only(Tally::default()),
    ];
    println!("{}\n", render(&shapes));

    println!("Example 2: Mutating through an erased value\n");
    let mut scalable: Vec<Poly<Scalable, Inline<16>>> = vec![
        Poly::new(Square { side: 1.0 }),
        Poly::new(Circle { radius: 2.0 }),
    ];
    for shape in &mut scalable {
        shape.call_mut::<Scale>(3.0);
    }
    let scaled: Vec<Poly<Drawable, Inline<16>>> =
        scalable.into_iter().map(Poly::upcast).collect();
    println!("{}\n", render(&scaled));

    println!("Example 3: Copies depend on the storage\n");
    let boxed: Poly<Drawable> = Poly::new_move_only(Tally::default());
    match boxed.try_clone() {
        Ok(_) => println!("copied a move-only value?"),
        Err(report) => println!("{report}\n"),
    }

    let shared: Poly<Drawable, Shared> = Poly::new_move_only(Tally::default());
    let copies: Vec<_> = (0..3).filter_map(|_| shared.try_clone().ok()).collect();
    println!("{} values share the tally", shared.share_count().unwrap_or(1));
    println!("{}", render(&copies));
}
