//! Overload sets and generic interfaces.
//!
//! An overload set is a group of capabilities with distinct names. A generic
//! interface such as `Function<A, R>` erases every closure with the same
//! signature.
//!
//! # Running this Demo
//!
//! ```bash
//! cargo run --example overloads --features std
//! ```

use core::marker::PhantomData;

use polyface::prelude::*;

struct Add;

impl Capability for Add {
    const NAME: &'static str = "add";
    type Receiver = ByMut;
    type Args<'a> = i64;
    type Output = i64;
}

struct AddPair;

impl Capability for AddPair {
    const NAME: &'static str = "add_pair";
    type Receiver = ByMut;
    type Args<'a> = (i64, i64);
    type Output = i64;
}

struct Value;

impl Capability for Value {
    const NAME: &'static str = "value";
    type Receiver = ByRef;
    type Args<'a> = ();
    type Output = i32;
}

interface! { struct Accumulator { Add, AddPair, Value } }

#[derive(Clone, Default)]
struct Sum(i64);

#[derive(Clone, Default)]
struct Product(i64);

impl ImplementationMut<Sum> for Add {
    fn invoke_mut<'a>(sum: &'a mut Sum, value: i64) -> i64 {
        sum.0 += value;
        sum.0
    }
}

impl ImplementationMut<Sum> for AddPair {
    fn invoke_mut<'a>(sum: &'a mut Sum, (a, b): (i64, i64)) -> i64 {
        sum.0 += a + b;
        sum.0
    }
}

impl Implementation<Sum> for Value {
    fn invoke<'a>(sum: &'a Sum, (): ()) -> i32 {
        sum.0 as i32
    }
}

impl ImplementationMut<Product> for Add {
    fn invoke_mut<'a>(product: &'a mut Product, value: i64) -> i64 {
        product.0 = product.0.max(1) * value;
        product.0
    }
}

impl ImplementationMut<Product> for AddPair {
    fn invoke_mut<'a>(product: &'a mut Product, (a, b): (i64, i64)) -> i64 {
        product.0 = product.0.max(1) * a * b;
        product.0
    }
}

impl Implementation<Product> for Value {
    fn invoke<'a>(product: &'a Product, (): ()) -> i32 {
        product.0 as i32
    }
}

struct Apply<A, R>(PhantomData<fn(A) -> R>);

impl<A: 'static, R: 'static> Capability for Apply<A, R> {
    const NAME: &'static str = "apply";
    type Receiver = ByRef;
    type Args<'a> = A;
    type Output = R;
}

impl<F, A, R> Implementation<F> for Apply<A, R>
where
    F: Fn(A) -> R + 'static,
    A: 'static,
    R: 'static,
{
    fn invoke<'a>(function: &'a F, args: A) -> R {
        function(args)
    }
}

struct Function<A, R>(PhantomData<fn(A) -> R>);

impl<A: 'static, R: 'static> Interface for Function<A, R> {
    const NAME: &'static str = "Function";
    type Base = ();
    type Capabilities = (Apply<A, R>,);
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut accumulators: Vec<Poly<Accumulator, Sbo<16>>> =
        vec![Poly::new(Sum::default()), Poly::new(Product::default())];
    for accumulator in &mut accumulators {
        accumulator.call_mut::<Add>(4);
        accumulator.call_mut::<AddPair>((2, 3));
        let wide: i64 = accumulator.call_as::<Value, i64>(());
        println!("{}: {wide}", accumulator.target_type_name());
    }

    let scale = 3;
    let functions: Vec<Poly<Function<i32, String>, Shared>> = vec![
        Poly::new(|x: i32| format!("{x} doubled is {}", x * 2)),
        Poly::new(move |x: i32| format!("{x} scaled is {}", x * scale)),
        Poly::new(|x: i32| format!("{x} in hex is {x:#x}")),
    ];
    for function in &functions {
        println!("{}", function.call::<Apply<i32, String>>(14));
    }
}
