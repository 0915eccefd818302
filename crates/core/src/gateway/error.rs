use thiserror::Error;

/// # Summary
/// 远程网关错误枚举，覆盖配置、传输、超时、远端报告以及响应形状五类失败。
///
/// # Invariants
/// - `Remote` 的内容原样来自远端脚本，不做任何改写。
/// - 网关内部从不重试，所有错误直接交给调用方。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// 未配置远程脚本地址，未发起任何网络请求
    #[error("Google Script URL not configured. Please check settings.")]
    NotConfigured,

    /// 网络失败、非成功状态码或脚本加载失败
    #[error("{0}")]
    Transport(String),

    /// 在限定时间内未收到回调
    #[error("Request timeout")]
    Timeout,

    /// 远端脚本显式返回的 `error`
    #[error("{0}")]
    Remote(String),

    /// 响应无法解析为预期形状
    #[error("Malformed response: {0}")]
    Decode(String),
}
