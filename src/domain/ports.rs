use crate::utils::error::Result;

/// 持久化的底層存取；每次呼叫都是完整讀取或完整寫入
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn data_file(&self) -> &str;
    fn default_term_days(&self) -> i64;
}
