mod storage_path_test;
mod vision_analysis_test;
