pub mod csv_codec;
