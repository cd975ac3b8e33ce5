//! End-to-end throughput benchmarks for both toolchain stages:
//! Jack source -> .vm bytecode, and .vm bytecode -> Hack assembly.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// A representative class: fields, constructor, methods, arrays, control
/// flow, strings, and OS calls.
const LIST_JACK: &str = r#"
class List {
    field Array items;
    field int size, capacity;

    constructor List new(int cap) {
        let items = Array.new(cap);
        let size = 0;
        let capacity = cap;
        return this;
    }

    method void push(int value) {
        if (size < capacity) {
            let items[size] = value;
            let size = size + 1;
        } else {
            do Sys.error(1);
        }
        return;
    }

    method int sum() {
        var int total, i;
        let total = 0;
        let i = 0;
        while (i < size) {
            let total = total + items[i];
            let i = i + 1;
        }
        return total;
    }

    method void print() {
        do Output.printString("sum: ");
        do Output.printInt(sum());
        return;
    }
}
"#;

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_list_class", |b| {
        b.iter(|| hackc::compile_source(black_box(LIST_JACK)).unwrap())
    });
}

fn bench_translate(c: &mut Criterion) {
    let vm_text = hackc::compile_source(LIST_JACK).unwrap();
    c.bench_function("translate_list_class", |b| {
        b.iter(|| hackc::translate_source("List", black_box(&vm_text), true).unwrap())
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    c.bench_function("jack_to_asm", |b| {
        b.iter(|| {
            let vm_text = hackc::compile_source(black_box(LIST_JACK)).unwrap();
            hackc::translate_source("List", &vm_text, true).unwrap()
        })
    });
}

criterion_group!(benches, bench_compile, bench_translate, bench_full_pipeline);
criterion_main!(benches);
