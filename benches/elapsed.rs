#![feature(test)]

extern crate test;

use nclock::init;
use test::Bencher;

#[bench]
fn bench_init(b: &mut Bencher) {
    b.iter(|| {
        init().unwrap();
    });
}

#[bench]
fn bench_elapsed(b: &mut Bencher) {
    let reference = init().unwrap();

    b.iter(|| {
        reference.elapsed().unwrap();
    });
}
