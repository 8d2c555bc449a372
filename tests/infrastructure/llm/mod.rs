mod sse_decoder_test;
