#[path = "../tests/common/budget_alloc.rs"]
mod budget_alloc;

use std::hint::black_box;
use std::time::Instant;

use budget_alloc::BudgetAlloc;
use image::{GrayImage, Luma};
use scrawl::{Glyph, GlyphBank, GlyphExtractor, ExtractOptions, PageSize};
use scrawl_embedded_graphics::{render_pages, EgRenderConfig};
use scrawl_render::{
    layout_flow, FlowConfig, LayoutConfig, LayoutEngine, NeverCancel, SeededJitter,
};

#[global_allocator]
static ALLOC: BudgetAlloc = BudgetAlloc::new();

const PARAGRAPH: &str = "it was a bright cold day in april and the clocks were striking thirteen \
winston smith his chin nuzzled into his breast in an effort to escape the vile wind \
slipped quickly through the glass doors of victory mansions";

struct CaseResult {
    case: &'static str,
    iterations: usize,
    min_ns: u128,
    median_ns: u128,
    max_ns: u128,
    median_peak_heap_bytes: usize,
    max_peak_heap_bytes: usize,
}

fn median<T: Copy>(sorted: &[T]) -> T {
    sorted[sorted.len() / 2]
}

fn run_case<F>(case: &'static str, warmup: usize, iters: usize, mut op: F) -> CaseResult
where
    F: FnMut() -> usize,
{
    for _ in 0..warmup {
        black_box(op());
    }
    let mut times = Vec::with_capacity(iters);
    let mut peaks = Vec::with_capacity(iters);
    for _ in 0..iters {
        let start = Instant::now();
        let (out, peak) = ALLOC.measure(&mut op);
        times.push(start.elapsed().as_nanos());
        peaks.push(peak);
        black_box(out);
    }
    times.sort_unstable();
    peaks.sort_unstable();
    CaseResult {
        case,
        iterations: iters,
        min_ns: times[0],
        median_ns: median(&times),
        max_ns: times[times.len() - 1],
        median_peak_heap_bytes: median(&peaks),
        max_peak_heap_bytes: peaks[peaks.len() - 1],
    }
}

fn bench_bank() -> GlyphBank {
    let mut bank = GlyphBank::new();
    for (i, ch) in ('a'..='z').enumerate() {
        let w = 18 + (i as u32 % 5) * 4;
        let h = 30 + (i as u32 % 4) * 3;
        bank.insert(ch, Glyph::new(GrayImage::from_pixel(w, h, Luma([35]))));
    }
    bank
}

/// A sheet of 8 rows by 12 glyph blobs.
fn bench_sheet() -> GrayImage {
    let mut sheet = GrayImage::from_pixel(1200, 800, Luma([240]));
    for row in 0..8u32 {
        for col in 0..12u32 {
            let (x0, y0) = (40 + col * 95, 40 + row * 95);
            for y in y0..y0 + 40 {
                for x in x0..x0 + 28 {
                    sheet.put_pixel(x, y, Luma([20]));
                }
            }
        }
    }
    sheet
}

fn main() {
    let quick = std::env::args().any(|arg| arg == "--quick");
    let (warmup, iters) = if quick { (1, 3) } else { (2, 10) };

    let bank = bench_bank();
    let text = vec![PARAGRAPH; 60].join("\n");
    let sheet = bench_sheet();
    let sheet_chars: String = ('a'..='z').chain('A'..='Z').chain('0'..='9').cycle().take(96).collect();

    println!("# scrawl layout benchmark");
    println!("# mode={} warmup={} iters={}", if quick { "quick" } else { "full" }, warmup, iters);
    println!("case,iterations,min_ns,median_ns,max_ns,median_peak_heap_bytes,max_peak_heap_bytes");

    let results = [
        run_case("extract_sheet", warmup, iters, || {
            GlyphExtractor::new(ExtractOptions::default())
                .extract_gray(&sheet, &sheet_chars)
                .map(|out| out.bank.len())
                .unwrap_or(0)
        }),
        run_case("layout_flow", warmup, iters, || {
            let out = layout_flow(&text, &bank, FlowConfig::default(), &mut SeededJitter::new(1));
            out.page.commands.len()
        }),
        run_case("layout_paginated_streaming", warmup, iters, || {
            let engine = LayoutEngine::new(LayoutConfig::for_page(PageSize::A4));
            let mut commands = 0;
            engine.layout_with(&text, &bank, &mut SeededJitter::new(1), &NeverCancel, |page| {
                commands += page.commands.len();
            });
            commands
        }),
        run_case("render_pages_letter", warmup, iters, || {
            let out = render_pages(
                &text,
                &bank,
                LayoutConfig::for_page(PageSize::Letter),
                EgRenderConfig::default(),
                &mut SeededJitter::new(1),
                &NeverCancel,
            );
            out.pages.len()
        }),
    ];

    for r in &results {
        println!(
            "{},{},{},{},{},{},{}",
            r.case,
            r.iterations,
            r.min_ns,
            r.median_ns,
            r.max_ns,
            r.median_peak_heap_bytes,
            r.max_peak_heap_bytes
        );
    }
}
