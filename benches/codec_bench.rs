use criterion::{criterion_group, criterion_main, Criterion, black_box};
use piebot_datagen::board::Position;
use piebot_datagen::selfplay::codec::{self, RecordFormat, PositionSample};

fn bench_codec(c: &mut Criterion) {
    let mut pos = Position::startpos();
    for m in ["e4", "c5", "Nf3", "d6", "d4", "cxd4", "Nxd4", "Nf6"] { pos.play_token(m).unwrap(); }
    c.bench_function("encode_board_sicilian", |ben| {
        ben.iter(|| black_box(codec::encode(black_box(&pos))))
    });

    let (board, side) = codec::encode(&pos);
    let sample = PositionSample { board, key: pos.key(), side, score: 35, mv: 0x0c1c, result: 1 };
    let packed = RecordFormat::Packed.codec();
    let mut out = Vec::with_capacity(64);
    c.bench_function("serialize_packed_record", |ben| {
        ben.iter(|| {
            out.clear();
            packed.encode_into(black_box(&sample), &mut out);
            black_box(out.len())
        })
    });
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
