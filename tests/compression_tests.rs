use assert_fs::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use vcfconv::{
    DirectoryConfig, convert_directory, convert_file,
    smart_reader::{Compression, TranscodingReader},
};

const VCF: &str = "##fileformat=VCFv4.2\n\
##FORMAT=<ID=FT,Number=1,Type=String,Description=\"Filter tag\">\n\
##FORMAT=<ID=CN,Number=1,Type=Integer,Description=\"Copy number\">\n\
##FORMAT=<ID=DP,Number=1,Type=Integer,Description=\"Depth\">\n\
##FORMAT=<ID=REPLEN,Number=1,Type=String,Description=\"Allele lengths\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\n\
chr5\t100\t.\tA\t.\t.\t.\t.\tFT:CN:DP:REPLEN\tPASS:2:30:4,5\n\
chr5\t200\t.\tA\t.\t.\t.\t.\tFT:CN:DP:REPLEN\tPASS:4:10:3,3,3,3\n";

const EXPECTED: &str = "str_id,copy_number,frequencies,genotype,depth,depth_norm\n\
chr5_99,2,,\"[4,5]\",30,15\n\
chr5_199,4,,\"[3,3,3,3]\",10,2.5\n";

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Concatenated gzip members, the layout BGZF uses.
fn multi_member(data: &[u8], chunk: usize) -> Vec<u8> {
    data.chunks(chunk).flat_map(gzip).collect()
}

fn write_bytes(dir: &assert_fs::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let child = dir.child(name);
    child.write_binary(bytes).unwrap();
    child.path().to_path_buf()
}

#[test]
fn gzip_input_converts_like_plain_input() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = write_bytes(&temp, "s.vcf.gz", &gzip(VCF.as_bytes()));
    let output = temp.child("s.csv");

    convert_file(&input, output.path()).unwrap();
    output.assert(EXPECTED);
}

#[test]
fn multi_member_gzip_is_read_to_the_end() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = write_bytes(&temp, "s.vcf.gz", &multi_member(VCF.as_bytes(), 64));
    let output = temp.child("s.csv");

    let summary = convert_file(&input, output.path()).unwrap();
    assert_eq!(summary.emitted_rows, 2);
    output.assert(EXPECTED);
}

#[test]
fn compression_is_detected_from_content() {
    let temp = assert_fs::TempDir::new().unwrap();
    let hidden = write_bytes(&temp, "hidden.vcf", &gzip(VCF.as_bytes()));
    let mislabelled = write_bytes(&temp, "plain.vcf.gz", VCF.as_bytes());

    let reader = TranscodingReader::open(&hidden).unwrap();
    assert_eq!(reader.compression(), Compression::Gzip);
    reader.close().unwrap();

    let reader = TranscodingReader::open(&mislabelled).unwrap();
    assert_eq!(reader.compression(), Compression::None);
    reader.close().unwrap();

    for (input, name) in [(hidden, "hidden.csv"), (mislabelled, "plain.csv")] {
        let output = temp.child(name);
        convert_file(&input, output.path()).unwrap();
        output.assert(EXPECTED);
    }
}

#[test]
fn directory_mode_mixes_plain_and_compressed_inputs() {
    let source = assert_fs::TempDir::new().unwrap();
    let out = assert_fs::TempDir::new().unwrap();
    write_bytes(&source, "a.vcf", VCF.as_bytes());
    write_bytes(&source, "b.vcf.gz", &gzip(VCF.as_bytes()));

    let report = convert_directory(&DirectoryConfig::new(source.path(), out.path())).unwrap();
    report.ensure_success().unwrap();

    out.child("a.csv").assert(EXPECTED);
    out.child("b.csv").assert(EXPECTED);
}

#[test]
fn truncated_gzip_fails_the_job() {
    let temp = assert_fs::TempDir::new().unwrap();
    let compressed = gzip(VCF.as_bytes());
    let input = write_bytes(&temp, "cut.vcf.gz", &compressed[..compressed.len() / 2]);
    let output = temp.child("cut.csv");

    assert!(convert_file(&input, output.path()).is_err());
}
