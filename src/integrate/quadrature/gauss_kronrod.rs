//! Embedded Gauss-Kronrod rules.
//!
//! Each rule pairs an n-point Gauss-Legendre rule with its (2n+1)-point Kronrod
//! extension. Both share the Gauss abscissae, so one batch of function values
//! yields two estimates and their difference serves as the local error.
//!
//! Tables hold the non-negative half of the symmetric abscissae on `[-1, 1]`
//! in decreasing order, the centre last. Gauss abscissae sit at the odd
//! positions; the centre is a Gauss abscissa only when n is odd.

use serde::{Deserialize, Serialize};

use crate::function::ScalarFunction;

/// The available Gauss-Kronrod pairs, named by their Kronrod point count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GaussKronrodRule {
    /// 7-point Gauss, 15-point Kronrod
    Gk15,
    /// 10-point Gauss, 21-point Kronrod
    Gk21,
    /// 15-point Gauss, 31-point Kronrod
    Gk31,
    /// 20-point Gauss, 41-point Kronrod
    #[default]
    Gk41,
    /// 25-point Gauss, 51-point Kronrod
    Gk51,
    /// 30-point Gauss, 61-point Kronrod
    Gk61,
}

/// Estimates produced by one application of a rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleEstimate {
    /// Kronrod (higher order) estimate
    pub kronrod: f64,
    /// Embedded Gauss estimate
    pub gauss: f64,
    /// `|kronrod - gauss|`
    pub error: f64,
    /// Number of function evaluations
    pub neval: usize,
}

struct RuleTable {
    xgk: &'static [f64],
    wgk: &'static [f64],
    wg: &'static [f64],
}

const MAX_POINTS: usize = 61;

impl GaussKronrodRule {
    /// Every rule, lowest order first.
    pub const ALL: [Self; 6] = [
        Self::Gk15,
        Self::Gk21,
        Self::Gk31,
        Self::Gk41,
        Self::Gk51,
        Self::Gk61,
    ];

    /// Look a rule up by its Kronrod point count.
    pub fn from_points(points: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|rule| rule.points() == points)
    }

    /// Number of Kronrod points (function evaluations per interval).
    pub fn points(self) -> usize {
        2 * self.gauss_points() + 1
    }

    /// Number of points of the embedded Gauss rule.
    pub fn gauss_points(self) -> usize {
        match self {
            Self::Gk15 => 7,
            Self::Gk21 => 10,
            Self::Gk31 => 15,
            Self::Gk41 => 20,
            Self::Gk51 => 25,
            Self::Gk61 => 30,
        }
    }

    fn table(self) -> RuleTable {
        match self {
            Self::Gk15 => RuleTable {
                xgk: &XGK15,
                wgk: &WGK15,
                wg: &WG15,
            },
            Self::Gk21 => RuleTable {
                xgk: &XGK21,
                wgk: &WGK21,
                wg: &WG21,
            },
            Self::Gk31 => RuleTable {
                xgk: &XGK31,
                wgk: &WGK31,
                wg: &WG31,
            },
            Self::Gk41 => RuleTable {
                xgk: &XGK41,
                wgk: &WGK41,
                wg: &WG41,
            },
            Self::Gk51 => RuleTable {
                xgk: &XGK51,
                wgk: &WGK51,
                wg: &WG51,
            },
            Self::Gk61 => RuleTable {
                xgk: &XGK61,
                wgk: &WGK61,
                wg: &WG61,
            },
        }
    }

    /// Apply the rule to `f` on `[low, high]`.
    ///
    /// Abscissae are mapped with `x = half * t + centre`, weights scaled by
    /// `half = (high - low) / 2`. No abscissa coincides with `low` or `high`.
    /// All points are evaluated in one [`ScalarFunction::evaluate_many`] call.
    pub fn evaluate<F>(self, f: &F, low: f64, high: f64) -> RuleEstimate
    where
        F: ScalarFunction + ?Sized,
    {
        let table = self.table();
        let n = self.points();
        let half_len = table.xgk.len() - 1;
        let centre = 0.5 * (low + high);
        let half = 0.5 * (high - low);

        let mut xs = [0.0; MAX_POINTS];
        let mut fv = [0.0; MAX_POINTS];

        // Layout: centre first, then (left, right) pairs in table order
        xs[0] = centre;
        for j in 0..half_len {
            let dx = half * table.xgk[j];
            xs[1 + 2 * j] = centre - dx;
            xs[2 + 2 * j] = centre + dx;
        }
        f.evaluate_many(&xs[..n], &mut fv[..n]);

        let f_centre = fv[0];
        let mut result_kronrod = table.wgk[half_len] * f_centre;
        let mut result_gauss = if self.gauss_points() % 2 == 1 {
            table.wg[table.wg.len() - 1] * f_centre
        } else {
            0.0
        };

        for j in 0..half_len {
            let pair = fv[1 + 2 * j] + fv[2 + 2 * j];
            result_kronrod += table.wgk[j] * pair;
            if j % 2 == 1 {
                result_gauss += table.wg[j / 2] * pair;
            }
        }

        let kronrod = result_kronrod * half;
        let gauss = result_gauss * half;

        RuleEstimate {
            kronrod,
            gauss,
            error: (kronrod - gauss).abs(),
            neval: n,
        }
    }
}

// K15 / G7
const XGK15: [f64; 8] = [
    0.9914553711208126,
    0.9491079123427585,
    0.8648644233597691,
    0.7415311855993945,
    0.5860872354676911,
    0.4058451513773972,
    0.20778495500789848,
    0.0,
];
const WGK15: [f64; 8] = [
    0.022935322010529224,
    0.06309209262997856,
    0.10479001032225019,
    0.14065325971552592,
    0.1690047266392679,
    0.19035057806478542,
    0.20443294007529889,
    0.20948214108472782,
];
const WG15: [f64; 4] = [
    0.1294849661688697,
    0.27970539148927664,
    0.3818300505051189,
    0.4179591836734694,
];

// K21 / G10
const XGK21: [f64; 11] = [
    0.9956571630258081,
    0.9739065285171717,
    0.9301574913557082,
    0.8650633666889845,
    0.7808177265864169,
    0.6794095682990244,
    0.5627571346686047,
    0.4333953941292472,
    0.2943928627014602,
    0.14887433898163122,
    0.0,
];
const WGK21: [f64; 11] = [
    0.011694638867371874,
    0.032558162307964725,
    0.054755896574351995,
    0.07503967481091996,
    0.0931254545836976,
    0.10938715880229764,
    0.12349197626206584,
    0.13470921731147334,
    0.14277593857706009,
    0.14773910490133849,
    0.1494455540029169,
];
const WG21: [f64; 5] = [
    0.06667134430868814,
    0.1494513491505806,
    0.21908636251598204,
    0.26926671930999635,
    0.29552422471475287,
];

// K31 / G15
const XGK31: [f64; 16] = [
    0.9980022986933971,
    0.9879925180204854,
    0.9677390756791391,
    0.937273392400706,
    0.8972645323440819,
    0.8482065834104272,
    0.790418501442466,
    0.7244177313601701,
    0.650996741297417,
    0.5709721726085388,
    0.4850818636402397,
    0.3941513470775634,
    0.29918000715316884,
    0.20119409399743451,
    0.1011420669187175,
    0.0,
];
const WGK31: [f64; 16] = [
    0.005377479872923349,
    0.015007947329316122,
    0.02546084732671532,
    0.03534636079137585,
    0.04458975132476488,
    0.05348152469092809,
    0.06200956780067064,
    0.06985412131872826,
    0.07684968075772038,
    0.08308050282313302,
    0.08856444305621176,
    0.09312659817082532,
    0.09664272698362368,
    0.09917359872179196,
    0.10076984552387559,
    0.10133000701479154,
];
const WG31: [f64; 8] = [
    0.03075324199611727,
    0.07036604748810812,
    0.10715922046717194,
    0.13957067792615432,
    0.16626920581699392,
    0.1861610000155622,
    0.19843148532711158,
    0.2025782419255613,
];

// K41 / G20
const XGK41: [f64; 21] = [
    0.9988590315882777,
    0.9931285991850949,
    0.9815078774502503,
    0.9639719272779138,
    0.9408226338317548,
    0.912234428251326,
    0.878276811252282,
    0.8391169718222188,
    0.7950414288375512,
    0.7463319064601508,
    0.6932376563347514,
    0.636053680726515,
    0.5751404468197103,
    0.5108670019508271,
    0.4435931752387251,
    0.37370608871541955,
    0.301627868114913,
    0.22778585114164507,
    0.15260546524092267,
    0.07652652113349734,
    0.0,
];
const WGK41: [f64; 21] = [
    0.0030735837185205317,
    0.008600269855642943,
    0.014626169256971253,
    0.020388373461266523,
    0.02588213360495116,
    0.0312873067770328,
    0.036600169758200796,
    0.041668873327973685,
    0.04643482186749767,
    0.05094457392372869,
    0.05519510534828599,
    0.05911140088063957,
    0.06265323755478117,
    0.06583459713361842,
    0.06864867292852161,
    0.07105442355344407,
    0.07303069033278667,
    0.07458287540049918,
    0.07570449768455667,
    0.07637786767208074,
    0.07660071191799965,
];
const WG41: [f64; 10] = [
    0.017614007139152118,
    0.04060142980038694,
    0.06267204833410907,
    0.08327674157670475,
    0.10193011981724044,
    0.11819453196151841,
    0.13168863844917664,
    0.14209610931838204,
    0.14917298647260374,
    0.15275338713072584,
];

// K51 / G25
const XGK51: [f64; 26] = [
    0.9992621049926098,
    0.9955569697904981,
    0.9880357945340772,
    0.9766639214595175,
    0.9616149864258425,
    0.9429745712289743,
    0.9207471152817016,
    0.8949919978782753,
    0.8658470652932756,
    0.833442628760834,
    0.7978737979985001,
    0.7592592630373576,
    0.7177664068130843,
    0.6735663684734684,
    0.6268100990103174,
    0.577662930241223,
    0.5263252843347191,
    0.473002731445715,
    0.4178853821930377,
    0.36117230580938786,
    0.30308953893110785,
    0.24386688372098844,
    0.1837189394210489,
    0.1228646926107104,
    0.06154448300568508,
    0.0,
];
const WGK51: [f64; 26] = [
    0.001987383892330316,
    0.005561932135356714,
    0.009473973386174152,
    0.013236229195571676,
    0.0168478177091283,
    0.020435371145882834,
    0.024009945606953215,
    0.02747531758785174,
    0.030792300167387487,
    0.034002130274329335,
    0.03711627148341554,
    0.04008382550403238,
    0.04287284502017005,
    0.04550291304992179,
    0.04798253713883671,
    0.05027767908071567,
    0.05236288580640747,
    0.05425112988854549,
    0.055950811220412316,
    0.057437116361567835,
    0.058689680022394206,
    0.05972034032417406,
    0.06053945537604586,
    0.061128509717053046,
    0.061471189871425316,
    0.061580818067832936,
];
const WG51: [f64; 13] = [
    0.011393798501026288,
    0.026354986615032137,
    0.040939156701306316,
    0.054904695975835194,
    0.06803833381235691,
    0.08014070033500102,
    0.09102826198296365,
    0.10053594906705064,
    0.10851962447426365,
    0.11485825914571164,
    0.11945576353578477,
    0.12224244299031004,
    0.12317605372671545,
];

// K61 / G30
const XGK61: [f64; 31] = [
    0.9994844100504906,
    0.9968934840746495,
    0.9916309968704046,
    0.9836681232797472,
    0.9731163225011262,
    0.9600218649683075,
    0.94437444474856,
    0.9262000474292743,
    0.9055733076999078,
    0.8825605357920527,
    0.8572052335460612,
    0.8295657623827684,
    0.799727835821839,
    0.7677774321048262,
    0.7337900624532268,
    0.6978504947933158,
    0.6600610641266269,
    0.6205261829892429,
    0.5793452358263617,
    0.5366241481420199,
    0.49248046786177857,
    0.44703376953808915,
    0.4004012548303944,
    0.3527047255308781,
    0.30407320227362505,
    0.25463692616788985,
    0.20452511668230988,
    0.15386991360858354,
    0.10280693796673702,
    0.0514718425553177,
    0.0,
];
const WGK61: [f64; 31] = [
    0.0013890136986770077,
    0.003890461127099884,
    0.0066307039159312926,
    0.009273279659517764,
    0.011823015253496341,
    0.014369729507045804,
    0.01692088918905327,
    0.019414141193942382,
    0.021828035821609193,
    0.0241911620780806,
    0.0265099548823331,
    0.02875404876504129,
    0.030907257562387762,
    0.03298144705748372,
    0.034979338028060025,
    0.03688236465182123,
    0.038678945624727595,
    0.040374538951535956,
    0.041969810215164244,
    0.04345253970135607,
    0.04481480013316266,
    0.04605923827100699,
    0.04718554656929915,
    0.04818586175708713,
    0.04905543455502978,
    0.04979568342707421,
    0.05040592140278235,
    0.05088179589874961,
    0.051221547849258774,
    0.05142612853745902,
    0.05149472942945157,
];
const WG61: [f64; 15] = [
    0.007968192496166605,
    0.01846646831109096,
    0.02878470788332337,
    0.03879919256962705,
    0.04840267283059405,
    0.057493156217619065,
    0.06597422988218049,
    0.0737559747377052,
    0.08075589522942021,
    0.08689978720108298,
    0.09212252223778612,
    0.09636873717464425,
    0.09959342058679527,
    0.1017623897484055,
    0.10285265289355884,
];
